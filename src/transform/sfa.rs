//! Symbolic Fourier Approximation (SFA).
//!
//! SFA slides a window over each series,
//! approximates every window by its leading Fourier values,
//! discretizes each value into a letter,
//! and counts the resulting words per series.
use serde::{Serialize, Deserialize};

use crate::error::{Result, TdeError};
use crate::sample::SeriesCollection;
use super::binning::{BinningMethod, Breakpoints};
use super::dft;
use super::word_bag::{WordBag, WordKey};


/// A transform that maps each series of a univariate collection
/// to a bag of symbolic words.
///
/// # Required Methods
/// - [`SymbolicTransform::fit`]
/// - [`SymbolicTransform::transform`]
///
/// # Provided Methods
/// - [`SymbolicTransform::fit_transform`]
pub trait SymbolicTransform {
    /// Learns the discretization from the training series and labels.
    fn fit(&mut self, x: &SeriesCollection, y: &[i64]) -> Result<()>;

    /// Returns one bag per case.
    fn transform(&self, x: &SeriesCollection) -> Result<Vec<WordBag>>;

    /// Fits on `x` and returns its bags.
    fn fit_transform(&mut self, x: &SeriesCollection, y: &[i64])
        -> Result<Vec<WordBag>>
    {
        self.fit(x, y)?;
        self.transform(x)
    }
}


#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedSfa {
    /// Number of Fourier values per word.
    dft_length: usize,
    /// Breakpoints of each Fourier value.
    breakpoints: Vec<Breakpoints>,
}


/// Symbolic Fourier Approximation with
/// optional bigrams and spatial pyramid levels.
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
/// let mut sfa = Sfa::new(10, 8)
///     .norm(true)
///     .levels(2)
///     .binning(BinningMethod::InformationGain);
/// let bags = sfa.fit_transform(&x, &y).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sfa {
    window_size: usize,
    word_length: usize,
    alphabet_size: usize,
    norm: bool,
    levels: usize,
    binning: BinningMethod,
    bigrams: bool,
    remove_repeat_words: bool,
    flat_keys: bool,

    fitted: Option<FittedSfa>,
}


impl Sfa {
    /// Construct a new `Sfa`.
    /// By default, `Sfa` sets the parameters as follows;
    /// ```text
    /// alphabet_size: 4,
    /// norm: false,
    /// levels: 1,
    /// binning: BinningMethod::EquiDepth,
    /// bigrams: false,
    /// remove_repeat_words: true,
    /// flat_keys: false,
    /// ```
    pub fn new(window_size: usize, word_length: usize) -> Self {
        Self {
            window_size,
            word_length,
            alphabet_size: 4,
            norm: false,
            levels: 1,
            binning: BinningMethod::EquiDepth,
            bigrams: false,
            remove_repeat_words: true,
            flat_keys: false,
            fitted: None,
        }
    }


    /// Set the number of letters.
    pub fn alphabet_size(mut self, alphabet_size: usize) -> Self {
        self.alphabet_size = alphabet_size;
        self
    }


    /// Drop the first Fourier coefficient,
    /// making words invariant to the window mean.
    pub fn norm(mut self, norm: bool) -> Self {
        self.norm = norm;
        self
    }


    /// Set the number of spatial pyramid levels.
    pub fn levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }


    /// Set the binning method.
    pub fn binning(mut self, binning: BinningMethod) -> Self {
        self.binning = binning;
        self
    }


    /// Count bigrams of words one window length apart.
    pub fn bigrams(mut self, bigrams: bool) -> Self {
        self.bigrams = bigrams;
        self
    }


    /// Skip a word equal to the word of the previous window.
    pub fn remove_repeat_words(mut self, flag: bool) -> Self {
        self.remove_repeat_words = flag;
        self
    }


    /// Fold the pyramid position into the word itself,
    /// so that no `WordKey::Pair` is emitted.
    pub fn flat_keys(mut self, flag: bool) -> Self {
        self.flat_keys = flag;
        self
    }


    /// The window length.
    pub fn window_size(&self) -> usize {
        self.window_size
    }


    /// Number of Fourier values per word after fitting.
    pub fn dft_length(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.dft_length)
    }


    /// Number of bits of one letter.
    #[inline]
    fn letter_bits(&self) -> u32 {
        (self.alphabet_size as f64).log2().ceil() as u32
    }


    fn check_params(&self, n_timepoints: usize) -> Result<()> {
        if self.window_size == 0 || self.window_size > n_timepoints {
            return Err(TdeError::Config(format!(
                "SFA window_size must be in [1, {n_timepoints}]. got {}",
                self.window_size
            )));
        }
        if self.word_length == 0 {
            return Err(TdeError::Config(
                "SFA word_length must be positive".into()
            ));
        }
        if self.alphabet_size < 2 {
            return Err(TdeError::Config(format!(
                "SFA alphabet_size must be at least 2. got {}",
                self.alphabet_size
            )));
        }
        if self.levels == 0 {
            return Err(TdeError::Config(
                "SFA needs at least one pyramid level".into()
            ));
        }
        Ok(())
    }


    /// Packs the letters of one approximation into a word.
    #[inline]
    fn word(&self, row: &[f64], breakpoints: &[Breakpoints]) -> u64 {
        let bits = self.letter_bits();
        row.iter()
            .zip(breakpoints)
            .fold(0u64, |word, (&value, bp)| (word << bits) | bp.letter(value))
    }


    /// Key of `word` at pyramid position `position`.
    #[inline]
    fn level_key(&self, word: u64, position: u64) -> WordKey {
        if self.flat_keys {
            WordKey::Word((word << self.levels) | position)
        } else {
            WordKey::Pair(word, position)
        }
    }


    fn bag_of(&self, fitted: &FittedSfa, series: &[f64]) -> WordBag {
        let start = usize::from(self.norm);
        let words = dft::sliding_dft(
                series, self.window_size, start, fitted.dft_length
            )
            .iter()
            .map(|row| self.word(row, &fitted.breakpoints))
            .collect::<Vec<_>>();
        let n_windows = words.len();

        let mut bag = WordBag::new();
        let mut last = None;
        for (i, &word) in words.iter().enumerate() {
            let repeated = self.remove_repeat_words && last == Some(word);
            last = Some(word);
            if repeated { continue; }

            let key = if self.levels > 1 {
                self.level_key(word, 0)
            } else {
                WordKey::Word(word)
            };
            *bag.entry(key).or_insert(0) += 1;

            if self.bigrams && i >= self.window_size {
                let bigram = WordKey::Bigram(words[i - self.window_size], word);
                *bag.entry(bigram).or_insert(0) += 1;
            }

            for level in 1..self.levels {
                let quadrants = 1usize << level;
                let quadrant = (i * quadrants / n_windows).min(quadrants - 1);
                let position = (quadrants - 1 + quadrant) as u64;
                *bag.entry(self.level_key(word, position)).or_insert(0)
                    += 1u32 << level;
            }
        }
        bag
    }
}


impl SymbolicTransform for Sfa {
    fn fit(&mut self, x: &SeriesCollection, y: &[i64]) -> Result<()> {
        let (n_cases, n_channels, n_timepoints) = x.shape();
        if n_channels != 1 {
            return Err(TdeError::InvalidInput(format!(
                "SFA transforms univariate collections. got {n_channels} channels"
            )));
        }
        if y.len() != n_cases {
            return Err(TdeError::InvalidInput(format!(
                "SFA got {n_cases} cases but {} labels", y.len()
            )));
        }
        self.check_params(n_timepoints)?;

        let start = usize::from(self.norm);
        let dft_length = self.word_length
            .min(dft::available_values(self.window_size, start));
        if dft_length == 0 {
            return Err(TdeError::Config(format!(
                "SFA window_size {} is too short to build a word",
                self.window_size
            )));
        }
        if dft_length as u32 * self.letter_bits() > 32 {
            return Err(TdeError::Config(format!(
                "SFA words of {dft_length} letters over {} symbols \
                do not fit in 32 bits",
                self.alphabet_size
            )));
        }

        let n_windows = n_timepoints + 1 - self.window_size;
        let mut columns = vec![Vec::with_capacity(n_cases * n_windows); dft_length];
        let mut window_labels = Vec::with_capacity(n_cases * n_windows);
        for (i, &label) in y.iter().enumerate() {
            let rows = dft::sliding_dft(
                x.series(i, 0), self.window_size, start, dft_length
            );
            for row in rows {
                row.into_iter()
                    .zip(columns.iter_mut())
                    .for_each(|(v, column)| column.push(v));
                window_labels.push(label as f64);
            }
        }

        let breakpoints = columns.iter()
            .map(|column| match self.binning {
                BinningMethod::EquiDepth => {
                    Breakpoints::equi_depth(column, self.alphabet_size)
                },
                BinningMethod::InformationGain => {
                    Breakpoints::information_gain(
                        column, &window_labels, self.alphabet_size
                    )
                },
            })
            .collect();

        self.fitted = Some(FittedSfa { dft_length, breakpoints });
        Ok(())
    }


    fn transform(&self, x: &SeriesCollection) -> Result<Vec<WordBag>> {
        let fitted = self.fitted.as_ref()
            .ok_or(TdeError::NotFitted {
                estimator: "SFA",
                operation: "transform",
            })?;

        let (n_cases, n_channels, n_timepoints) = x.shape();
        if n_channels != 1 {
            return Err(TdeError::InvalidInput(format!(
                "SFA transforms univariate collections. got {n_channels} channels"
            )));
        }
        if n_timepoints < self.window_size {
            return Err(TdeError::InvalidInput(format!(
                "series of length {n_timepoints} are shorter than \
                the window size {}",
                self.window_size
            )));
        }

        let bags = (0..n_cases)
            .map(|i| self.bag_of(fitted, x.series(i, 0)))
            .collect();
        Ok(bags)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::word_bag::bag_total;

    fn ramp_and_wave() -> (SeriesCollection, Vec<i64>) {
        let series = (0..6)
            .map(|i| {
                (0..40)
                    .map(|t| {
                        let t = t as f64;
                        if i % 2 == 0 {
                            (t * 0.3).sin()
                        } else {
                            0.05 * t + (t * 1.7).cos() * 0.1
                        }
                    })
                    .collect()
            })
            .collect();
        let x = SeriesCollection::from_univariate(series).unwrap();
        let y = vec![0, 1, 0, 1, 0, 1];
        (x, y)
    }

    #[test]
    fn test_single_level_words_are_plain() {
        let (x, y) = ramp_and_wave();
        let mut sfa = Sfa::new(8, 4)
            .binning(BinningMethod::InformationGain);
        let bags = sfa.fit_transform(&x, &y).unwrap();

        assert_eq!(bags.len(), 6);
        for bag in bags {
            assert!(!bag.is_empty());
            assert!(bag.keys().all(|k| matches!(k, WordKey::Word(_))));
            // At most one word per window.
            assert!(bag_total(&bag) <= 33);
        }
    }

    #[test]
    fn test_pyramid_positions() {
        let (x, y) = ramp_and_wave();
        let mut sfa = Sfa::new(8, 4).levels(3).remove_repeat_words(false);
        let bags = sfa.fit_transform(&x, &y).unwrap();

        for bag in bags {
            let mut per_level = [0u64; 3];
            for (key, count) in bag.iter() {
                let WordKey::Pair(_, position) = key else {
                    panic!("pyramid bags use pair keys. got {key:?}");
                };
                let level = match position {
                    0 => 0,
                    1..=2 => 1,
                    3..=6 => 2,
                    _ => panic!("unexpected position {position}"),
                };
                per_level[level] += u64::from(*count);
            }
            // Every window lands once per level, weighted by `2^level`.
            assert_eq!(per_level, [33, 66, 132]);
        }
    }

    #[test]
    fn test_flat_keys_and_bigrams() {
        let (x, y) = ramp_and_wave();
        let mut sfa = Sfa::new(8, 4)
            .levels(2)
            .bigrams(true)
            .flat_keys(true);
        let bags = sfa.fit_transform(&x, &y).unwrap();
        assert!(bags.iter()
            .flat_map(|bag| bag.keys())
            .all(|k| !matches!(k, WordKey::Pair(..))));
    }

    #[test]
    fn test_word_length_is_capped_by_window() {
        let (x, y) = ramp_and_wave();
        let mut sfa = Sfa::new(6, 16).norm(true);
        sfa.fit(&x, &y).unwrap();
        assert_eq!(sfa.dft_length(), Some(6));
    }

    #[test]
    fn test_transform_before_fit() {
        let (x, _) = ramp_and_wave();
        let sfa = Sfa::new(8, 4);
        assert!(matches!(
            sfa.transform(&x),
            Err(TdeError::NotFitted { .. })
        ));
    }

    #[test]
    fn test_window_longer_than_series() {
        let (x, y) = ramp_and_wave();
        let mut sfa = Sfa::new(41, 4);
        assert!(matches!(sfa.fit(&x, &y), Err(TdeError::Config(_))));
    }
}
