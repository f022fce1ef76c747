//! 1-nearest-neighbor search over word bags
//! under the histogram intersection.
use rand::Rng;

use crate::transform::{WordBag, histogram_intersection};


/// Label of the training bag most similar to `bag`.
///
/// On an exact tie the current best is replaced with probability `0.5`.
/// The first candidate is always taken without a draw.
pub(crate) fn nearest_label<R>(
    bag: &WordBag,
    train_bags: &[WordBag],
    labels: &[i64],
    rng: &mut R,
) -> Option<i64>
    where R: Rng,
{
    let mut best: Option<(u64, i64)> = None;
    for (train_bag, &label) in train_bags.iter().zip(labels) {
        let sim = histogram_intersection(bag, train_bag);
        let replace = match best {
            None => true,
            Some((best_sim, _)) => {
                sim > best_sim || (sim == best_sim && rng.gen::<f64>() < 0.5)
            },
        };
        if replace {
            best = Some((sim, label));
        }
    }
    best.map(|(_, label)| label)
}


/// Leave-one-out label of the training case `i`.
/// Ties keep the first neighbor seen.
/// Returns `None` if there is no other case.
pub(crate) fn loo_label(i: usize, bags: &[WordBag], labels: &[i64])
    -> Option<i64>
{
    let bag = &bags[i];
    let mut best: Option<(u64, i64)> = None;
    for (j, (other, &label)) in bags.iter().zip(labels).enumerate() {
        if j == i { continue; }

        let sim = histogram_intersection(bag, other);
        if best.map_or(true, |(best_sim, _)| sim > best_sim) {
            best = Some((sim, label));
        }
    }
    best.map(|(_, label)| label)
}


/// Mean absolute error between labels and predictions.
#[inline]
pub(crate) fn label_mae(labels: &[i64], predictions: &[i64]) -> f64 {
    let total = labels.iter()
        .zip(predictions)
        .map(|(&y, &p)| (y - p).unsigned_abs())
        .sum::<u64>();
    total as f64 / labels.len() as f64
}
