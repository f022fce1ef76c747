//! Synthetic ordinal time series shared by the integration tests.
#![allow(dead_code)]

use rand::prelude::*;
use rand_distr::Normal;

use ordinal_tde::SeriesCollection;


/// `n_cases` noisy sine waves whose frequency grows with the label.
/// Labels cycle through `0..n_classes`.
/// Every channel carries the same wave with a channel-specific offset.
pub fn ordinal_waves(
    n_cases: usize,
    n_channels: usize,
    n_timepoints: usize,
    n_classes: i64,
    seed: u64,
) -> (SeriesCollection, Vec<i64>)
{
    let mut rng = StdRng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 0.05).unwrap();

    let y = (0..n_cases)
        .map(|i| i as i64 % n_classes)
        .collect::<Vec<_>>();

    let cases = y.iter()
        .map(|&label| {
            let phase = rng.gen_range(0.0..1.0);
            (0..n_channels)
                .map(|c| {
                    (0..n_timepoints)
                        .map(|t| {
                            let t = t as f64;
                            let freq = (label as f64 + 1.0) * 0.3;
                            (freq * t + phase).sin()
                                + 0.2 * c as f64
                                + noise.sample(&mut rng)
                        })
                        .collect()
                })
                .collect()
        })
        .collect();

    (SeriesCollection::from_cases(cases).unwrap(), y)
}


/// Univariate shorthand of [`ordinal_waves`].
pub fn univariate(n_cases: usize, seed: u64) -> (SeriesCollection, Vec<i64>) {
    ordinal_waves(n_cases, 1, 40, 3, seed)
}
