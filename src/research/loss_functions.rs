/// Zero-one loss of one prediction.
pub fn zero_one_loss(true_label: i64, prediction: i64) -> f64 {
    if true_label == prediction { 0.0 } else { 1.0 }
}


/// Absolute loss of one prediction.
/// The labels are ordinal, so distant mistakes cost more.
pub fn absolute_loss(true_label: i64, prediction: i64) -> f64 {
    (true_label - prediction).unsigned_abs() as f64
}


/// Mean absolute error over aligned labels and predictions.
/// Returns `0` for empty input.
///
/// # Panics
/// Panics if the lengths differ.
pub fn mean_absolute_error(labels: &[i64], predictions: &[i64]) -> f64 {
    mean_loss(labels, predictions, absolute_loss)
}


/// Error rate over aligned labels and predictions.
///
/// # Panics
/// Panics if the lengths differ.
pub fn error_rate(labels: &[i64], predictions: &[i64]) -> f64 {
    mean_loss(labels, predictions, zero_one_loss)
}


fn mean_loss<F>(labels: &[i64], predictions: &[i64], loss: F) -> f64
    where F: Fn(i64, i64) -> f64,
{
    assert_eq!(
        labels.len(), predictions.len(),
        "labels and predictions must have the same length"
    );
    if labels.is_empty() { return 0.0; }

    let total = labels.iter()
        .zip(predictions)
        .map(|(&y, &p)| loss(y, p))
        .sum::<f64>();
    total / labels.len() as f64
}
