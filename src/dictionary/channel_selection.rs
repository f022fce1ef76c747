//! Channel selection of multivariate dictionary members.
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use tracing::debug;

use crate::error::Result;
use crate::estimator::JobPool;
use crate::sample::SeriesCollection;
use crate::transform::{Sfa, SymbolicTransform, WordBag};
use super::nearest_neighbor::{label_mae, loo_label};


/// The channels a member keeps,
/// with the fitted transform and training bags of each one.
#[derive(Debug, Clone)]
pub(crate) struct ChannelSelection {
    pub(crate) channels: Vec<usize>,
    pub(crate) transforms: Vec<Sfa>,
    pub(crate) bags: Vec<Vec<WordBag>>,
}


/// Scores every channel by its leave-one-out MAE
/// and keeps the channels with
/// `mae <= min_mae * (1 + (1 - dim_threshold))`.
/// If more than `max_dims` channels pass,
/// `max_dims` of them are drawn without replacement
/// and kept in the order they were drawn.
///
/// The best channel always passes for `dim_threshold` in `[0, 1]`.
pub(crate) fn select_channels<F>(
    x: &SeriesCollection,
    y: &[i64],
    make_transform: F,
    dim_threshold: f64,
    max_dims: usize,
    random_state: Option<u64>,
    pool: &JobPool,
) -> Result<ChannelSelection>
    where F: Fn() -> Sfa,
{
    let n_cases = x.n_cases();

    let mut transforms = Vec::with_capacity(x.n_channels());
    let mut bags = Vec::with_capacity(x.n_channels());
    let mut maes = Vec::with_capacity(x.n_channels());
    for channel in 0..x.n_channels() {
        let mut sfa = make_transform();
        let channel_bags = sfa.fit_transform(&x.channel(channel), y)?;

        let predictions = pool.map_indexed(n_cases, |i| {
            loo_label(i, &channel_bags, y).unwrap_or(y[i])
        });
        let mae = label_mae(y, &predictions);
        debug!("channel {channel}: leave-one-out MAE {mae:.4}");

        transforms.push(sfa);
        bags.push(channel_bags);
        maes.push(mae);
    }

    let mut accepted = accepted_channels(&maes, dim_threshold);

    if accepted.len() > max_dims {
        let mut rng = match random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        accepted = index::sample(&mut rng, accepted.len(), max_dims)
            .into_iter()
            .map(|k| accepted[k])
            .collect();
    }

    let mut transforms = transforms.into_iter()
        .map(Some)
        .collect::<Vec<_>>();
    let mut bags = bags.into_iter()
        .map(Some)
        .collect::<Vec<_>>();

    let mut selection = ChannelSelection {
        channels: Vec::with_capacity(accepted.len()),
        transforms: Vec::with_capacity(accepted.len()),
        bags: Vec::with_capacity(accepted.len()),
    };
    for channel in accepted {
        if let (Some(sfa), Some(channel_bags))
            = (transforms[channel].take(), bags[channel].take())
        {
            selection.channels.push(channel);
            selection.transforms.push(sfa);
            selection.bags.push(channel_bags);
        }
    }
    Ok(selection)
}


/// Channels with `mae <= min_mae * (1 + (1 - dim_threshold))`, ascending.
pub(crate) fn accepted_channels(maes: &[f64], dim_threshold: f64)
    -> Vec<usize>
{
    let min_mae = maes.iter().copied().fold(f64::INFINITY, f64::min);
    let bound = min_mae * (1.0 + (1.0 - dim_threshold));
    maes.iter()
        .enumerate()
        .filter_map(|(c, &mae)| (mae <= bound).then_some(c))
        .collect()
}
