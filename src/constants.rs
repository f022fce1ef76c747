//! Constants shared by the transform, the member classifier,
//! and the ensemble.

/// Word lengths explored by the parameter search.
pub const WORD_LENGTHS: [usize; 5] = [16, 14, 12, 10, 8];
/// Normalisation options explored by the parameter search.
pub const NORM_OPTIONS: [bool; 2] = [true, false];
/// Spatial pyramid levels explored by the parameter search.
pub const LEVELS: [usize; 3] = [1, 2, 3];
/// Information gain binning options.
/// The ordinal ensemble never uses equi-depth binning.
pub const IGB_OPTIONS: [bool; 1] = [true];
/// Alphabet size of the SFA words built by the ensemble.
pub const ALPHABET_SIZE: usize = 4;

/// Proportion of the training cases drawn for each member.
pub const SUBSAMPLE_PROPORTION: f64 = 0.7;
/// MAE recorded for a member rejected early.
pub const REJECTED_MAE: f64 = 100.0;
/// Lower bound on a member weight.
pub const MIN_MEMBER_WEIGHT: f64 = 1e-9;
/// Exponent applied to `1 / (1 + |MAE|)` to obtain a member weight.
pub const WEIGHT_EXPONENT: i32 = 4;

/// Ridge penalty of the surrogate model.
pub const SURROGATE_ALPHA: f64 = 1.0;
/// Independent term of the polynomial kernel.
pub const SURROGATE_COEF0: f64 = 1.0;
/// Degree of the polynomial kernel.
pub const SURROGATE_DEGREE: i32 = 1;

/// Standard deviations below this value are treated as zero.
pub const NUMERIC_TOLERANCE: f64 = 1e-8;

/// Default number of parameter vectors evaluated by the ensemble.
pub const DEFAULT_N_PARAMETER_SAMPLES: usize = 250;
/// Default maximum number of retained members.
pub const DEFAULT_MAX_ENSEMBLE_SIZE: usize = 50;
/// Default maximum window length as a proportion of the series length.
pub const DEFAULT_MAX_WIN_LEN_PROP: f64 = 1.0;
/// Default minimum window length.
pub const DEFAULT_MIN_WINDOW: usize = 10;
/// Default number of uniformly drawn parameter vectors
/// before the surrogate takes over.
pub const DEFAULT_RANDOMLY_SELECTED_PARAMS: usize = 50;
/// Default channel acceptance threshold.
pub const DEFAULT_DIM_THRESHOLD: f64 = 0.85;
/// Default maximum number of channels per member.
pub const DEFAULT_MAX_DIMS: usize = 20;

pub(crate) const PRINT_WIDTH: usize = 8;
pub(crate) const FULL_WIDTH: usize = 60;
