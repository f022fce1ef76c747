use crate::error::{Result, TdeError};
use crate::sample::SeriesCollection;
use super::capabilities::{Capabilities, check_collection};


/// The common surface of every estimator in this crate.
pub trait Estimator {
    /// Returns the name of the estimator.
    fn name(&self) -> &'static str;

    /// Returns the capabilities of the estimator.
    fn capabilities(&self) -> Capabilities;

    /// Returns the configuration of the estimator as `(key, value)` pairs.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }

    /// Returns `true` once `fit` succeeded.
    fn is_fitted(&self) -> bool;
}


/// A trait that defines the behavior of a time series classifier
/// over ordinal integer labels.
///
/// # Required Methods
/// - [`Classifier::fit`]
/// - [`Classifier::classes`]
/// - [`Classifier::predict_proba`]
/// - [`Classifier::predict`]
pub trait Classifier: Estimator {
    /// Fits the classifier on `x` and the labels `y`.
    fn fit(&mut self, x: &SeriesCollection, y: &[i64]) -> Result<()>;

    /// The sorted distinct labels seen in `fit`.
    fn classes(&self) -> Result<&[i64]>;

    /// Returns one probability row per case,
    /// in the order of [`Classifier::classes`].
    fn predict_proba(&self, x: &SeriesCollection) -> Result<Vec<Vec<f64>>>;

    /// Returns one predicted label per case.
    fn predict(&self, x: &SeriesCollection) -> Result<Vec<i64>>;
}


/// Checks the training input of `fit`.
pub(crate) fn check_fit_input(
    estimator: &'static str,
    capabilities: &Capabilities,
    x: &SeriesCollection,
    y: &[i64],
) -> Result<()>
{
    if x.n_cases() != y.len() {
        return Err(TdeError::InvalidInput(format!(
            "{estimator} got {} cases but {} labels",
            x.n_cases(),
            y.len()
        )));
    }
    check_collection(estimator, capabilities, &x.metadata())
}


/// Checks that the input of `predict` matches the shape seen in `fit`.
pub(crate) fn check_predict_input(
    estimator: &'static str,
    capabilities: &Capabilities,
    x: &SeriesCollection,
    n_channels: usize,
    n_timepoints: usize,
) -> Result<()>
{
    let (_, channels, timepoints) = x.shape();
    if channels != n_channels || timepoints != n_timepoints {
        return Err(TdeError::InvalidInput(format!(
            "{estimator} was fitted on series with {n_channels} channels \
            of length {n_timepoints}. got {channels} channels \
            of length {timepoints}"
        )));
    }
    check_collection(estimator, capabilities, &x.metadata())
}


/// Returns the sorted distinct labels.
pub(crate) fn unique_classes(y: &[i64]) -> Vec<i64> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}


/// Position of `label` in the sorted `classes`.
#[inline]
pub(crate) fn class_index(classes: &[i64], label: i64) -> Result<usize> {
    classes.binary_search(&label)
        .map_err(|_| TdeError::InvalidInput(format!(
            "label {label} is not one of the training labels {classes:?}"
        )))
}
