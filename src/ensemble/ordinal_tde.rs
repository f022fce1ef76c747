//! Provides [`OrdinalTde`],
//! the Ordinal Temporal Dictionary Ensemble.
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use serde::{Serialize, Deserialize};
use tracing::{debug, warn};

use std::time::{Duration, Instant};

use crate::constants::{ALPHABET_SIZE, SUBSAMPLE_PROPORTION};
use crate::dictionary::{IndividualOrdinalTde, ParameterVector};
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
use crate::research::SearchLogger;
use crate::sample::SeriesCollection;
use super::config::OrdinalTdeConfig;
use super::member::{EnsembleMember, MemberPool, evaluate, member_weight};
use super::search_space::{WindowRange, candidates};
use super::surrogate::Surrogate;
use super::train_estimate::{TrainEstimateMethod, VoteTable};

const NAME: &str = "OrdinalTDE";


/// The fitted state of an [`OrdinalTde`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedEnsemble {
    members: Vec<EnsembleMember>,
    weights: Vec<f64>,
    weight_sum: f64,
    classes: Vec<i64>,
    n_cases: usize,
    n_channels: usize,
    n_timepoints: usize,
    // Every evaluated parameter vector with its recorded MAE.
    history: Vec<(ParameterVector, f64)>,
}


/// The Ordinal Temporal Dictionary Ensemble (O-TDE).
///
/// O-TDE searches the SFA parameter space
/// (window size, word length, normalisation, pyramid levels),
/// first uniformly at random and then guided by a kernel ridge
/// surrogate of the member MAE.
/// Each evaluated parameter vector builds one
/// [`IndividualOrdinalTde`] on a `70%` subsample of the cases.
/// The ensemble keeps the `max_ensemble_size` members
/// with the lowest leave-one-out MAE,
/// and votes with weight `(1 / (1 + MAE))^4`.
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
/// let mut clf = OrdinalTde::init()
///     .n_parameter_samples(50)
///     .max_ensemble_size(10)
///     .random_state(Some(0))
///     .verbose(true);
/// clf.fit(&x, &y).unwrap();
///
/// let predictions = clf.predict(&x).unwrap();
/// let mae = mean_absolute_error(&y, &predictions);
/// println!("Train MAE: {mae}");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdinalTde {
    config: OrdinalTdeConfig,
    fitted: Option<FittedEnsemble>,
}


impl OrdinalTde {
    /// Construct a new `OrdinalTde` with the default configuration.
    /// See [`OrdinalTdeConfig`] for the defaults.
    pub fn init() -> Self {
        Self::default()
    }


    /// Construct a new `OrdinalTde` from a configuration.
    pub fn from_config(config: OrdinalTdeConfig) -> Self {
        Self { config, fitted: None }
    }


    /// The configuration.
    pub fn config(&self) -> &OrdinalTdeConfig {
        &self.config
    }


    /// Set the number of parameter vectors evaluated
    /// without a time contract.
    pub fn n_parameter_samples(mut self, n: usize) -> Self {
        self.config.n_parameter_samples = n;
        self
    }


    /// Set the maximum number of retained members.
    pub fn max_ensemble_size(mut self, size: usize) -> Self {
        self.config.max_ensemble_size = size;
        self
    }


    /// Set the maximum window length
    /// as a proportion of the series length, in `(0, 1]`.
    pub fn max_win_len_prop(mut self, prop: f64) -> Self {
        self.config.max_win_len_prop = prop;
        self
    }


    /// Set the minimum window length.
    pub fn min_window(mut self, min_window: usize) -> Self {
        self.config.min_window = min_window;
        self
    }


    /// Set the number of parameter vectors drawn uniformly at random
    /// before the surrogate takes over.
    pub fn randomly_selected_params(mut self, n: usize) -> Self {
        self.config.randomly_selected_params = n;
        self
    }


    /// Count word bigrams. `None` uses them for univariate data only.
    pub fn bigrams(mut self, bigrams: Option<bool>) -> Self {
        self.config.bigrams = bigrams;
        self
    }


    /// Set the channel acceptance threshold, in `[0, 1]`.
    pub fn dim_threshold(mut self, dim_threshold: f64) -> Self {
        self.config.dim_threshold = dim_threshold;
        self
    }


    /// Set the maximum number of channels per member.
    pub fn max_dims(mut self, max_dims: usize) -> Self {
        self.config.max_dims = max_dims;
        self
    }


    /// Set the build time contract in minutes. `0` disables it.
    /// Under a contract, `n_parameter_samples` is ignored and
    /// `contract_max_n_parameter_samples` caps the search.
    pub fn time_limit_in_minutes(mut self, minutes: f64) -> Self {
        self.config.time_limit_in_minutes = minutes;
        self
    }


    /// Cap the search under a time contract.
    pub fn contract_max_n_parameter_samples(mut self, n: Option<usize>)
        -> Self
    {
        self.config.contract_max_n_parameter_samples = n;
        self
    }


    /// Pack multivariate keys into plain integer words.
    pub fn flat_channel_keys(mut self, flag: bool) -> Self {
        self.config.flat_channel_keys = flag;
        self
    }


    /// Set the in-sample estimate of `fit_predict_proba`.
    pub fn train_estimate_method(mut self, method: TrainEstimateMethod)
        -> Self
    {
        self.config.train_estimate_method = method;
        self
    }


    /// Set the number of workers.
    pub fn n_jobs(mut self, n_jobs: Option<isize>) -> Self {
        self.config.n_jobs = n_jobs;
        self
    }


    /// Set the seed of every random draw.
    pub fn random_state(mut self, random_state: Option<u64>) -> Self {
        self.config.random_state = random_state;
        self
    }


    /// Print the search progress to the console.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }


    fn fitted(&self, operation: &'static str) -> Result<&FittedEnsemble> {
        self.fitted.as_ref()
            .ok_or(TdeError::NotFitted { estimator: NAME, operation })
    }


    fn rng(&self) -> StdRng {
        match self.config.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }


    /// Number of retained members.
    pub fn n_estimators(&self) -> Result<usize> {
        Ok(self.fitted("n_estimators")?.members.len())
    }


    /// The retained members.
    pub fn estimators(&self) -> Result<&[EnsembleMember]> {
        Ok(&self.fitted("estimators")?.members[..])
    }


    /// Voting weights of the retained members.
    pub fn weights(&self) -> Result<&[f64]> {
        Ok(&self.fitted("weights")?.weights[..])
    }


    /// Sum of the voting weights.
    pub fn weight_sum(&self) -> Result<f64> {
        Ok(self.fitted("weight_sum")?.weight_sum)
    }


    /// Number of distinct labels seen in `fit`.
    pub fn n_classes(&self) -> Result<usize> {
        Ok(self.fitted("n_classes")?.classes.len())
    }


    /// Number of training cases.
    pub fn n_cases(&self) -> Result<usize> {
        Ok(self.fitted("n_cases")?.n_cases)
    }


    /// Number of channels of the training series.
    pub fn n_channels(&self) -> Result<usize> {
        Ok(self.fitted("n_channels")?.n_channels)
    }


    /// Length of the training series.
    pub fn n_timepoints(&self) -> Result<usize> {
        Ok(self.fitted("n_timepoints")?.n_timepoints)
    }


    /// Every evaluated parameter vector with its recorded MAE,
    /// in evaluation order.
    pub fn parameter_history(&self) -> Result<&[(ParameterVector, f64)]> {
        Ok(&self.fitted("parameter_history")?.history[..])
    }


    /// Picks the candidate with the lowest predicted MAE.
    /// Ties are drawn uniformly at random.
    fn surrogate_pick(
        history: &[(ParameterVector, f64)],
        candidates: &[ParameterVector],
        rng: &mut StdRng,
    ) -> Result<usize>
    {
        let features = history.iter()
            .map(|(params, _)| params.features())
            .collect::<Vec<_>>();
        let maes = history.iter()
            .map(|&(_, mae)| mae)
            .collect::<Vec<_>>();
        let surrogate = Surrogate::fit(&features, &maes)?;

        let predictions = candidates.iter()
            .map(|params| surrogate.predict(&params.features()))
            .collect::<Vec<_>>();
        let min = predictions.iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let minimizers = predictions.iter()
            .enumerate()
            .filter_map(|(i, &p)| (p == min).then_some(i))
            .collect::<Vec<_>>();

        minimizers.choose(rng)
            .copied()
            .ok_or_else(|| TdeError::Numerical(
                "the surrogate predicted no finite MAE".into()
            ))
    }


    /// Runs the parameter search.
    /// `keep_train_predictions` keeps each member's
    /// leave-one-out predictions for the in-sample estimates.
    fn fit_ensemble(
        &mut self,
        x: &SeriesCollection,
        y: &[i64],
        keep_train_predictions: bool,
    ) -> Result<()>
    {
        self.fitted = None;
        check_fit_input(NAME, &self.capabilities(), x, y)?;
        self.config.validate()?;
        let config = &self.config;

        let n_jobs = resolve_n_jobs(config.n_jobs, true)?;
        let pool = JobPool::new(n_jobs)?;

        if config.n_parameter_samples <= config.randomly_selected_params {
            warn!(
                "n_parameter_samples ({}) <= randomly_selected_params ({}); \
                every member parameter is drawn at random",
                config.n_parameter_samples,
                config.randomly_selected_params,
            );
        }

        let (n_cases, n_channels, n_timepoints) = x.shape();
        let subsample_size = (n_cases as f64 * SUBSAMPLE_PROPORTION) as usize;
        if subsample_size < 2 {
            return Err(TdeError::InvalidInput(format!(
                "{NAME} needs at least 3 cases to draw subsamples. \
                got {n_cases}"
            )));
        }

        let range = WindowRange::new(
            n_timepoints, config.min_window, config.max_win_len_prop
        )?;
        let mut remaining = candidates(&range);

        let (time_limit, n_parameter_samples, contract_max) =
            match config.time_limit()? {
                Some(limit) => {
                    let cap = config.contract_max_n_parameter_samples
                        .unwrap_or(usize::MAX);
                    (limit, 0, cap)
                },
                None => (Duration::ZERO, config.n_parameter_samples, usize::MAX),
            };

        let use_bigrams = config.bigrams.unwrap_or(n_channels == 1);
        let mut rng = self.rng();

        let logger = SearchLogger::new(config.verbose);
        logger.print_stats(
            NAME,
            self.info(),
            (time_limit > Duration::ZERO).then_some(time_limit),
        );

        let mut members = MemberPool::new(config.max_ensemble_size);
        let mut history = Vec::new();
        let mut n_evaluated = 0usize;

        let start = Instant::now();
        let mut train_time = Duration::ZERO;
        while ((train_time < time_limit && n_evaluated < contract_max)
            || n_evaluated < n_parameter_samples)
            && !remaining.is_empty()
        {
            let pick = if n_evaluated < config.randomly_selected_params {
                rng.gen_range(0..remaining.len())
            } else {
                Self::surrogate_pick(&history, &remaining, &mut rng)?
            };
            let params = remaining.remove(pick);

            let subsample = index::sample(&mut rng, n_cases, subsample_size)
                .into_vec();
            let x_sub = x.select(&subsample);
            let y_sub = subsample.iter()
                .map(|&i| y[i])
                .collect::<Vec<_>>();

            let mut classifier = IndividualOrdinalTde::new(params)
                .alphabet_size(ALPHABET_SIZE)
                .bigrams(use_bigrams)
                .dim_threshold(config.dim_threshold)
                .max_dims(config.max_dims)
                .flat_channel_keys(config.flat_channel_keys)
                .n_jobs(Some(n_jobs as isize))
                .random_state(config.random_state);
            classifier.fit_with(&x_sub, &y_sub, &pool)?;

            let (mae, predictions) = evaluate(
                &classifier, &y_sub, members.threshold(), &pool
            )?;
            let weight = member_weight(mae);

            let member = EnsembleMember {
                classifier,
                params,
                weight,
                subsample,
                mae,
                train_predictions: keep_train_predictions.then_some(predictions),
            };

            let kept = members.offer(member);
            history.push((params, mae));
            n_evaluated += 1;
            train_time = start.elapsed();

            let (worst_mae, worst_idx) = members.worst();
            debug!(
                "[{n_evaluated}] {params}: MAE {mae:.4}, weight {weight:.6}, \
                kept {kept}, {} members, worst #{worst_idx} ({worst_mae:.4})",
                members.len(),
            );
            logger.log_iteration(
                n_evaluated, &params, mae, weight, members.len(), train_time
            );
        }
        if remaining.is_empty() {
            debug!("every candidate parameter vector has been evaluated");
        }
        logger.finish(n_evaluated, members.len(), train_time);

        let members = members.into_members();
        let weights = members.iter()
            .map(|m| m.weight)
            .collect::<Vec<_>>();
        let weight_sum = weights.iter().sum();

        self.fitted = Some(FittedEnsemble {
            members,
            weights,
            weight_sum,
            classes: unique_classes(y),
            n_cases,
            n_channels,
            n_timepoints,
            history,
        });
        Ok(())
    }


    /// Fits the ensemble and returns in-sample probability estimates
    /// of the training cases, following
    /// [`OrdinalTdeConfig::train_estimate_method`].
    ///
    /// A case no member estimates gets a uniform row.
    pub fn fit_predict_proba(&mut self, x: &SeriesCollection, y: &[i64])
        -> Result<Vec<Vec<f64>>>
    {
        self.fit_ensemble(x, y, true)?;
        let fitted = self.fitted("fit_predict_proba")?;

        let mut table = VoteTable::new(fitted.n_cases, fitted.classes.len());
        match self.config.train_estimate_method {
            TrainEstimateMethod::Loocv => {
                for member in &fitted.members {
                    let Some(predictions) = &member.train_predictions
                        else { continue; };
                    for (&case, &label) in member.subsample.iter().zip(predictions) {
                        let class = class_index(&fitted.classes, label)?;
                        table.vote(case, class, member.weight);
                    }
                }
            },
            TrainEstimateMethod::Oob => {
                let pool = JobPool::new(resolve_n_jobs(self.config.n_jobs, true)?)?;
                for member in &fitted.members {
                    let mut in_bag = vec![false; fitted.n_cases];
                    member.subsample.iter().for_each(|&i| in_bag[i] = true);
                    let oob = (0..fitted.n_cases)
                        .filter(|&i| !in_bag[i])
                        .collect::<Vec<_>>();
                    if oob.is_empty() { continue; }

                    let predictions = member.classifier
                        .predict_with(&x.select(&oob), &pool)?;
                    for (&case, label) in oob.iter().zip(predictions) {
                        let class = class_index(&fitted.classes, label)?;
                        table.vote(case, class, member.weight);
                    }
                }
            },
        }
        Ok(table.into_probas())
    }


    /// Fits the ensemble and returns in-sample label estimates.
    /// See [`OrdinalTde::fit_predict_proba`].
    pub fn fit_predict(&mut self, x: &SeriesCollection, y: &[i64])
        -> Result<Vec<i64>>
    {
        let probas = self.fit_predict_proba(x, y)?;
        let classes = &self.fitted("fit_predict")?.classes;
        Ok(self.argmax_labels(&probas, classes))
    }


    /// Label of the most probable class of each row.
    /// Ties are drawn uniformly at random.
    fn argmax_labels(&self, probas: &[Vec<f64>], classes: &[i64]) -> Vec<i64> {
        let mut rng = self.rng();
        probas.iter()
            .map(|row| {
                let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let best = row.iter()
                    .enumerate()
                    .filter_map(|(k, &p)| (p == max).then_some(k))
                    .collect::<Vec<_>>();
                let k = best.choose(&mut rng).copied().unwrap_or(0);
                classes[k]
            })
            .collect()
    }
}


impl Estimator for OrdinalTde {
    fn name(&self) -> &'static str {
        NAME
    }


    fn capabilities(&self) -> Capabilities {
        Capabilities {
            multivariate: true,
            missing_values: false,
            multithreading: true,
            train_estimate: true,
            contractable: true,
        }
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let config = &self.config;
        let contract = if config.time_limit_in_minutes > 0.0 {
            format!("{} min", config.time_limit_in_minutes)
        } else {
            "-".to_string()
        };
        let seed = config.random_state
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        let info = Vec::from([
            ("Parameter samples", format!("{}", config.n_parameter_samples)),
            ("Max ensemble size", format!("{}", config.max_ensemble_size)),
            ("Random parameters", format!("{}", config.randomly_selected_params)),
            ("Min window", format!("{}", config.min_window)),
            ("Max window prop.", format!("{}", config.max_win_len_prop)),
            ("Time contract", contract),
            ("Train estimate", config.train_estimate_method.to_string()),
            ("Seed", seed),
        ]);
        Some(info)
    }


    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}


impl Classifier for OrdinalTde {
    fn fit(&mut self, x: &SeriesCollection, y: &[i64]) -> Result<()> {
        self.fit_ensemble(x, y, false)
    }


    fn classes(&self) -> Result<&[i64]> {
        Ok(&self.fitted("classes")?.classes[..])
    }


    fn predict_proba(&self, x: &SeriesCollection) -> Result<Vec<Vec<f64>>> {
        let fitted = self.fitted("predict_proba")?;
        check_predict_input(
            NAME,
            &self.capabilities(),
            x,
            fitted.n_channels,
            fitted.n_timepoints,
        )?;

        let pool = JobPool::new(resolve_n_jobs(self.config.n_jobs, true)?)?;
        let mut sums = vec![vec![0f64; fitted.classes.len()]; x.n_cases()];
        for member in &fitted.members {
            let predictions = member.classifier.predict_with(x, &pool)?;
            for (row, label) in sums.iter_mut().zip(predictions) {
                row[class_index(&fitted.classes, label)?] += member.weight;
            }
        }

        sums.iter_mut()
            .flat_map(|row| row.iter_mut())
            .for_each(|p| *p /= fitted.weight_sum);
        Ok(sums)
    }


    fn predict(&self, x: &SeriesCollection) -> Result<Vec<i64>> {
        let probas = self.predict_proba(x)?;
        let classes = &self.fitted("predict")?.classes;
        Ok(self.argmax_labels(&probas, classes))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::REJECTED_MAE;

    fn ordinal_waves(n_cases: usize) -> (SeriesCollection, Vec<i64>) {
        let y = (0..n_cases).map(|i| (i % 3) as i64).collect::<Vec<_>>();
        let series = y.iter()
            .enumerate()
            .map(|(i, &label)| {
                (0..30)
                    .map(|t| {
                        let t = t as f64;
                        let phase = i as f64 * 0.1;
                        ((label as f64 + 1.0) * 0.3 * t + phase).sin()
                    })
                    .collect()
            })
            .collect();
        (SeriesCollection::from_univariate(series).unwrap(), y)
    }

    fn small() -> OrdinalTde {
        OrdinalTde::init()
            .n_parameter_samples(4)
            .max_ensemble_size(2)
            .randomly_selected_params(2)
            .random_state(Some(7))
    }

    #[test]
    fn test_pool_is_bounded() {
        let (x, y) = ordinal_waves(12);
        let mut clf = small();
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.n_estimators().unwrap(), 2);
        assert_eq!(clf.parameter_history().unwrap().len(), 4);
        let weights = clf.weights().unwrap();
        assert_eq!(weights.len(), 2);
        let sum = weights.iter().sum::<f64>();
        assert!((clf.weight_sum().unwrap() - sum).abs() < 1e-12);

        for member in clf.estimators().unwrap() {
            assert_eq!(member.subsample().len(), 8);
            assert!(member.train_predictions().is_none());
            assert_eq!(member.weight(), member_weight(member.mae()));
        }
    }

    #[test]
    fn test_history_is_distinct() {
        let (x, y) = ordinal_waves(12);
        let mut clf = small();
        clf.fit(&x, &y).unwrap();

        let history = clf.parameter_history().unwrap();
        for (i, (a, _)) in history.iter().enumerate() {
            for (b, _) in &history[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_not_fitted() {
        let (x, _) = ordinal_waves(6);
        let clf = small();
        assert!(matches!(
            clf.predict_proba(&x),
            Err(TdeError::NotFitted { .. })
        ));
        assert!(clf.n_estimators().is_err());
    }

    #[test]
    fn test_too_few_cases() {
        let (x, y) = ordinal_waves(2);
        let mut clf = small();
        assert!(matches!(clf.fit(&x, &y), Err(TdeError::InvalidInput(_))));
    }

    #[test]
    fn test_predict_shape_mismatch() {
        let (x, y) = ordinal_waves(12);
        let mut clf = small();
        clf.fit(&x, &y).unwrap();

        let short = SeriesCollection::from_univariate(vec![vec![0.0; 20]])
            .unwrap();
        assert!(matches!(
            clf.predict(&short),
            Err(TdeError::InvalidInput(_))
        ));
    }

    /// Identical constant series labelled `0`, except one case labelled `10`.
    /// A member's MAE is `0` when its subsample misses that case.
    fn one_outlier(n_cases: usize) -> (SeriesCollection, Vec<i64>) {
        let series = vec![vec![1.0; 40]; n_cases];
        let mut y = vec![0; n_cases];
        y[n_cases / 2] = 10;
        (SeriesCollection::from_univariate(series).unwrap(), y)
    }

    #[test]
    fn test_rejected_members_are_recorded() {
        let (x, y) = one_outlier(20);
        let mut clf = OrdinalTde::init()
            .n_parameter_samples(20)
            .max_ensemble_size(1)
            .randomly_selected_params(20)
            .random_state(Some(3));
        clf.fit(&x, &y).unwrap();

        let history = clf.parameter_history().unwrap();
        assert_eq!(history.len(), 20);
        assert!(history.iter().any(|&(_, mae)| mae == REJECTED_MAE));

        // The single slot ends up with the lowest MAE seen.
        let best = history.iter()
            .map(|&(_, mae)| mae)
            .fold(f64::INFINITY, f64::min);
        let members = clf.estimators().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].mae(), best);
        assert!(best < REJECTED_MAE);
    }

    #[test]
    fn test_failed_refit_clears_the_ensemble() {
        let (x, y) = ordinal_waves(12);
        let mut clf = small();
        clf.fit(&x, &y).unwrap();
        assert!(clf.is_fitted());

        assert!(clf.fit(&x, &y[..5]).is_err());
        assert!(!clf.is_fitted());
        assert!(matches!(
            clf.predict(&x),
            Err(TdeError::NotFitted { .. })
        ));
    }

    #[test]
    fn test_unrepresentable_time_contract() {
        let (x, y) = ordinal_waves(12);
        let mut clf = small()
            .time_limit_in_minutes(1e20)
            .contract_max_n_parameter_samples(Some(2));
        assert!(matches!(clf.fit(&x, &y), Err(TdeError::Config(_))));
        assert!(!clf.is_fitted());
    }

    #[test]
    fn test_unset_n_jobs() {
        let (x, y) = ordinal_waves(12);
        let mut clf = small().n_jobs(None);
        assert!(matches!(clf.fit(&x, &y), Err(TdeError::Config(_))));
    }
}
