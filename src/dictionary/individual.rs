//! Provides [`IndividualOrdinalTde`],
//! the dictionary classifier that makes up one ensemble member.
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Serialize, Deserialize};

use crate::constants::{
    ALPHABET_SIZE,
    DEFAULT_DIM_THRESHOLD,
    DEFAULT_MAX_DIMS,
};
use crate::error::{Result, TdeError};
use crate::estimator::{
    Capabilities,
    Classifier,
    Estimator,
    JobPool,
    resolve_n_jobs,
    check_fit_input,
    check_predict_input,
    unique_classes,
    class_index,
};
use crate::sample::SeriesCollection;
use crate::transform::{Sfa, SymbolicTransform, WordBag, WordKey};
use crate::transform::word_bag::bags_as_pairs;
use super::channel_selection::select_channels;
use super::nearest_neighbor::{nearest_label, loo_label};
use super::parameters::ParameterVector;

const NAME: &str = "IndividualOrdinalTDE";


/// The fitted state of an [`IndividualOrdinalTde`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedMember {
    // Channels of the training collection that contribute words.
    channels: Vec<usize>,
    // One fitted transform per entry of `channels`.
    transforms: Vec<Sfa>,
    // Bits reserved for the channel index in multivariate keys.
    highest_dim_bit: u32,
    n_channels: usize,
    n_timepoints: usize,
    #[serde(with = "bags_as_pairs")]
    bags: Vec<WordBag>,
    labels: Vec<i64>,
    classes: Vec<i64>,
}


/// A 1-nearest-neighbor classifier over SFA word bags,
/// compared by histogram intersection.
///
/// Univariate series get one bag each.
/// For multivariate series the member keeps the channels
/// whose leave-one-out MAE is close to the best channel
/// and merges their bags, tagging every word with its channel.
///
/// # Example
/// ```no_run
/// use ordinal_tde::prelude::*;
///
/// let (x, y) = SeriesReader::default()
///     .file("train.ts")
///     .read()
///     .unwrap();
///
/// let params = ParameterVector::new(12, 8, true, 2, true);
/// let mut member = IndividualOrdinalTde::new(params)
///     .random_state(Some(0));
/// member.fit(&x, &y).unwrap();
/// let predictions = member.predict(&x).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualOrdinalTde {
    params: ParameterVector,
    alphabet_size: usize,
    bigrams: bool,
    dim_threshold: f64,
    max_dims: usize,
    flat_channel_keys: bool,
    n_jobs: Option<isize>,
    random_state: Option<u64>,

    fitted: Option<FittedMember>,
}


impl IndividualOrdinalTde {
    /// Construct a new `IndividualOrdinalTde`.
    /// By default, the member sets the parameters as follows;
    /// ```text
    /// alphabet_size: 4,
    /// bigrams: true,
    /// dim_threshold: 0.85,
    /// max_dims: 20,
    /// flat_channel_keys: false,
    /// n_jobs: Some(1),
    /// random_state: None,
    /// ```
    pub fn new(params: ParameterVector) -> Self {
        Self {
            params,
            alphabet_size: ALPHABET_SIZE,
            bigrams: true,
            dim_threshold: DEFAULT_DIM_THRESHOLD,
            max_dims: DEFAULT_MAX_DIMS,
            flat_channel_keys: false,
            n_jobs: Some(1),
            random_state: None,
            fitted: None,
        }
    }


    /// Set the number of SFA letters.
    pub fn alphabet_size(mut self, alphabet_size: usize) -> Self {
        self.alphabet_size = alphabet_size;
        self
    }


    /// Count word bigrams.
    pub fn bigrams(mut self, bigrams: bool) -> Self {
        self.bigrams = bigrams;
        self
    }


    /// Set the channel acceptance threshold, in `[0, 1]`.
    /// A channel is kept if its MAE is at most
    /// `(2 - dim_threshold)` times the best channel MAE.
    pub fn dim_threshold(mut self, dim_threshold: f64) -> Self {
        self.dim_threshold = dim_threshold;
        self
    }


    /// Set the maximum number of channels kept.
    pub fn max_dims(mut self, max_dims: usize) -> Self {
        self.max_dims = max_dims;
        self
    }


    /// Pack channels into plain integer words
    /// instead of `(word, tag)` pairs.
    pub fn flat_channel_keys(mut self, flag: bool) -> Self {
        self.flat_channel_keys = flag;
        self
    }


    /// Set the number of workers used by `predict`.
    pub fn n_jobs(mut self, n_jobs: Option<isize>) -> Self {
        self.n_jobs = n_jobs;
        self
    }


    /// Set the seed of the tie-breaking and channel subsampling draws.
    pub fn random_state(mut self, random_state: Option<u64>) -> Self {
        self.random_state = random_state;
        self
    }


    /// The hyper-parameters of this member.
    pub fn params(&self) -> &ParameterVector {
        &self.params
    }


    /// Channels that contribute words, in selection order.
    pub fn channels(&self) -> Option<&[usize]> {
        self.fitted.as_ref().map(|f| &f.channels[..])
    }


    /// Bits reserved for the channel index in multivariate keys,
    /// `ceil(log2(n_channels)) + 1`.
    pub fn highest_dim_bit(&self) -> Option<u32> {
        self.fitted.as_ref().map(|f| f.highest_dim_bit)
    }


    /// Number of training cases.
    pub fn n_cases(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.labels.len())
    }


    fn fitted(&self, operation: &'static str) -> Result<&FittedMember> {
        self.fitted.as_ref()
            .ok_or(TdeError::NotFitted { estimator: NAME, operation })
    }


    fn check_params(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.dim_threshold) {
            return Err(TdeError::Config(format!(
                "dim_threshold must be in [0, 1]. got {}",
                self.dim_threshold
            )));
        }
        if self.max_dims == 0 {
            return Err(TdeError::Config(
                "max_dims must be positive".into()
            ));
        }
        Ok(())
    }


    fn make_transform(&self) -> Sfa {
        self.params.sfa(self.alphabet_size)
            .bigrams(self.bigrams)
            .flat_keys(self.flat_channel_keys)
    }


    fn case_rng(&self) -> StdRng {
        match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }


    /// Fits the member, running per-case work on `pool`.
    pub(crate) fn fit_with(
        &mut self,
        x: &SeriesCollection,
        y: &[i64],
        pool: &JobPool,
    ) -> Result<()>
    {
        check_fit_input(NAME, &self.capabilities(), x, y)?;
        self.check_params()?;

        let (_, n_channels, n_timepoints) = x.shape();
        let highest_dim_bit = (n_channels as f64).log2().ceil() as u32 + 1;

        let (channels, transforms, bags) = if n_channels == 1 {
            let mut sfa = self.make_transform();
            let bags = sfa.fit_transform(x, y)?;
            (vec![0], vec![sfa], bags)
        } else {
            let selection = select_channels(
                x,
                y,
                || self.make_transform(),
                self.dim_threshold,
                self.max_dims,
                self.random_state,
                pool,
            )?;
            let bags = self.merge_channels(
                &selection.channels, selection.bags, highest_dim_bit
            );
            (selection.channels, selection.transforms, bags)
        };

        self.fitted = Some(FittedMember {
            channels,
            transforms,
            highest_dim_bit,
            n_channels,
            n_timepoints,
            bags,
            labels: y.to_vec(),
            classes: unique_classes(y),
        });
        Ok(())
    }


    /// Tags the key of a word from `channel`.
    #[inline]
    fn channel_key(&self, key: WordKey, channel: usize, highest_dim_bit: u32)
        -> WordKey
    {
        let channel = channel as u64;
        match key {
            WordKey::Pair(word, position) => {
                WordKey::Pair(word, (position << highest_dim_bit) | channel)
            },
            WordKey::Word(word) if self.flat_channel_keys => {
                WordKey::Word((word << highest_dim_bit) | channel)
            },
            WordKey::Word(word) => WordKey::Pair(word, channel),
            WordKey::Bigram(prev, word) => {
                WordKey::Bigram(prev, (word << highest_dim_bit) | channel)
            },
        }
    }


    /// Merges per-channel bags (`bags[k][case]` for `channels[k]`)
    /// into one bag per case.
    fn merge_channels(
        &self,
        channels: &[usize],
        bags: Vec<Vec<WordBag>>,
        highest_dim_bit: u32,
    ) -> Vec<WordBag>
    {
        let n_cases = bags.first().map_or(0, |b| b.len());
        let mut merged = vec![WordBag::new(); n_cases];
        for (&channel, channel_bags) in channels.iter().zip(bags) {
            for (bag, channel_bag) in merged.iter_mut().zip(channel_bags) {
                for (key, count) in channel_bag {
                    let key = self.channel_key(key, channel, highest_dim_bit);
                    *bag.entry(key).or_insert(0) += count;
                }
            }
        }
        merged
    }


    /// Bags of unseen cases, built with the fitted transforms.
    fn bags_of(&self, fitted: &FittedMember, x: &SeriesCollection)
        -> Result<Vec<WordBag>>
    {
        if fitted.n_channels == 1 {
            return fitted.transforms[0].transform(x);
        }

        let bags = fitted.channels.iter()
            .zip(&fitted.transforms)
            .map(|(&channel, sfa)| sfa.transform(&x.channel(channel)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.merge_channels(&fitted.channels, bags, fitted.highest_dim_bit))
    }


    /// Predicts `x`, running the per-case search on `pool`.
    /// Every case draws its ties from a generator
    /// freshly seeded with `random_state`.
    pub(crate) fn predict_with(&self, x: &SeriesCollection, pool: &JobPool)
        -> Result<Vec<i64>>
    {
        let fitted = self.fitted("predict")?;
        check_predict_input(
            NAME,
            &self.capabilities(),
            x,
            fitted.n_channels,
            fitted.n_timepoints,
        )?;

        let bags = self.bags_of(fitted, x)?;
        pool.try_map_indexed(bags.len(), |i| {
            let mut rng = self.case_rng();
            nearest_label(&bags[i], &fitted.bags, &fitted.labels, &mut rng)
                .ok_or_else(|| TdeError::InvalidInput(
                    "the member has no training cases".into()
                ))
        })
    }


    /// Leave-one-out prediction of the training case `i`.
    /// Ties keep the first neighbor seen.
    pub fn train_predict(&self, i: usize) -> Result<i64> {
        let fitted = self.fitted("train_predict")?;
        if i >= fitted.labels.len() {
            return Err(TdeError::InvalidInput(format!(
                "case {i} is out of range for {} training cases",
                fitted.labels.len()
            )));
        }
        loo_label(i, &fitted.bags, &fitted.labels)
            .ok_or_else(|| TdeError::InvalidInput(
                "leave-one-out needs at least two training cases".into()
            ))
    }
}


impl Estimator for IndividualOrdinalTde {
    fn name(&self) -> &'static str {
        NAME
    }


    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multivariate: true,
            multithreading: true,
            ..Capabilities::default()
        }
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = Vec::from([
            ("Window size", format!("{}", self.params.window_size)),
            ("Word length", format!("{}", self.params.word_length)),
            ("Normalise", format!("{}", self.params.norm)),
            ("Levels", format!("{}", self.params.levels)),
            ("IGB", format!("{}", self.params.igb)),
            ("Bigrams", format!("{}", self.bigrams)),
        ]);
        Some(info)
    }


    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}


impl Classifier for IndividualOrdinalTde {
    fn fit(&mut self, x: &SeriesCollection, y: &[i64]) -> Result<()> {
        let pool = JobPool::new(resolve_n_jobs(self.n_jobs, true)?)?;
        self.fit_with(x, y, &pool)
    }


    fn classes(&self) -> Result<&[i64]> {
        Ok(&self.fitted("classes")?.classes[..])
    }


    fn predict_proba(&self, x: &SeriesCollection) -> Result<Vec<Vec<f64>>> {
        let classes = &self.fitted("predict_proba")?.classes;
        self.predict(x)?
            .into_iter()
            .map(|label| {
                let mut row = vec![0f64; classes.len()];
                row[class_index(classes, label)?] = 1.0;
                Ok(row)
            })
            .collect()
    }


    fn predict(&self, x: &SeriesCollection) -> Result<Vec<i64>> {
        let pool = JobPool::new(resolve_n_jobs(self.n_jobs, true)?)?;
        self.predict_with(x, &pool)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn waves(n_channels: usize) -> (SeriesCollection, Vec<i64>) {
        let cases = (0..12)
            .map(|i| {
                let label = (i % 3) as f64;
                (0..n_channels)
                    .map(|c| {
                        (0..32)
                            .map(|t| {
                                let t = t as f64;
                                ((label + 1.0) * 0.25 * t).sin()
                                    + 0.01 * (c as f64) * t
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();
        let x = SeriesCollection::from_cases(cases).unwrap();
        let y = (0..12).map(|i| i % 3).collect();
        (x, y)
    }

    fn member() -> IndividualOrdinalTde {
        IndividualOrdinalTde::new(ParameterVector::new(8, 4, true, 1, true))
            .random_state(Some(1))
    }

    #[test]
    fn test_predict_before_fit() {
        let (x, _) = waves(1);
        let err = member().predict(&x).unwrap_err();
        assert!(matches!(err, TdeError::NotFitted { .. }));
    }

    #[test]
    fn test_univariate_fit_predict() {
        let (x, y) = waves(1);
        let mut clf = member();
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.channels(), Some(&[0][..]));
        assert_eq!(clf.highest_dim_bit(), Some(1));
        // Each case is its own nearest neighbor.
        assert_eq!(clf.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_train_predict_excludes_self() {
        let (x, y) = waves(1);
        let mut clf = member();
        clf.fit(&x, &y).unwrap();
        // Identical series share a class,
        // so leave-one-out still finds the right label.
        for i in 0..y.len() {
            assert_eq!(clf.train_predict(i).unwrap(), y[i]);
        }
        assert!(clf.train_predict(12).is_err());
    }

    #[test]
    fn test_multivariate_keys_are_tagged() {
        let (x, y) = waves(3);
        let mut clf = member();
        clf.fit(&x, &y).unwrap();

        let channels = clf.channels().unwrap().to_vec();
        assert!(!channels.is_empty());
        assert_eq!(clf.highest_dim_bit(), Some(3));

        let fitted = clf.fitted.as_ref().unwrap();
        for bag in &fitted.bags {
            for key in bag.keys() {
                let tag = match *key {
                    WordKey::Pair(_, tag) => tag,
                    WordKey::Bigram(_, word) => word,
                    WordKey::Word(_) => panic!("untagged word {key:?}"),
                };
                let channel = (tag & 0b111) as usize;
                assert!(channels.contains(&channel));
            }
        }
    }

    #[test]
    fn test_proba_is_one_hot() {
        let (x, y) = waves(1);
        let mut clf = member();
        clf.fit(&x, &y).unwrap();
        let probas = clf.predict_proba(&x).unwrap();
        for row in probas {
            assert_eq!(row.len(), 3);
            assert_eq!(row.iter().sum::<f64>(), 1.0);
        }
    }

    #[test]
    fn test_invalid_dim_threshold() {
        let (x, y) = waves(2);
        let mut clf = member().dim_threshold(1.5);
        assert!(matches!(clf.fit(&x, &y), Err(TdeError::Config(_))));
    }
}
