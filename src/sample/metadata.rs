use serde::{Serialize, Deserialize};


/// Summary of a [`SeriesCollection`](super::SeriesCollection)
/// used to check it against the capabilities of an estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Number of cases.
    pub n_cases: usize,
    /// Number of channels per case.
    pub n_channels: usize,
    /// Length of every series.
    pub n_timepoints: usize,
    /// `true` if `n_channels > 1`.
    pub multivariate: bool,
    /// `true` if any value is `NaN`.
    pub missing_values: bool,
}
