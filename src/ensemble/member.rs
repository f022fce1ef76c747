use serde::{Serialize, Deserialize};

use crate::constants::{MIN_MEMBER_WEIGHT, REJECTED_MAE, WEIGHT_EXPONENT};
use crate::dictionary::{IndividualOrdinalTde, ParameterVector};
use crate::dictionary::nearest_neighbor::label_mae;
use crate::error::Result;
use crate::estimator::JobPool;


/// A retained member of the ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleMember {
    pub(crate) classifier: IndividualOrdinalTde,
    pub(crate) params: ParameterVector,
    pub(crate) weight: f64,
    pub(crate) subsample: Vec<usize>,
    pub(crate) mae: f64,
    pub(crate) train_predictions: Option<Vec<i64>>,
}


impl EnsembleMember {
    /// The fitted classifier.
    pub fn classifier(&self) -> &IndividualOrdinalTde {
        &self.classifier
    }


    /// The parameters the member was built with.
    pub fn params(&self) -> &ParameterVector {
        &self.params
    }


    /// The voting weight, `max((1 / (1 + |mae|))^4, 1e-9)`.
    pub fn weight(&self) -> f64 {
        self.weight
    }


    /// Indices of the training cases the member was fitted on.
    pub fn subsample(&self) -> &[usize] {
        &self.subsample[..]
    }


    /// The recorded leave-one-out MAE
    /// (`100` for a member rejected early).
    pub fn mae(&self) -> f64 {
        self.mae
    }


    /// Leave-one-out predictions of the subsample,
    /// kept by `fit_predict` and `fit_predict_proba`.
    pub fn train_predictions(&self) -> Option<&[i64]> {
        self.train_predictions.as_deref()
    }
}


/// Voting weight of a member with the given MAE.
/// Strictly decreasing in `|mae|`.
#[inline]
pub fn member_weight(mae: f64) -> f64 {
    (1.0 / (1.0 + mae.abs()))
        .powi(WEIGHT_EXPONENT)
        .max(MIN_MEMBER_WEIGHT)
}


/// Leave-one-out MAE of a fitted member on its own subsample
/// and the predictions behind it.
/// An MAE above `threshold` is recorded as `100`.
pub(crate) fn evaluate(
    classifier: &IndividualOrdinalTde,
    labels: &[i64],
    threshold: f64,
    pool: &JobPool,
) -> Result<(f64, Vec<i64>)>
{
    let predictions = pool.try_map_indexed(labels.len(), |i| {
        classifier.train_predict(i)
    })?;
    let mae = label_mae(labels, &predictions);
    let mae = if mae > threshold { REJECTED_MAE } else { mae };
    Ok((mae, predictions))
}


/// MAE and index of the worst member.
/// Starts from `(0.0, 0)` and only moves on a strictly larger MAE.
pub(crate) fn worst_member(members: &[EnsembleMember]) -> (f64, usize) {
    members.iter()
        .enumerate()
        .fold((0.0, 0), |(worst, idx), (i, m)| {
            if m.mae > worst { (m.mae, i) } else { (worst, idx) }
        })
}


/// The retained members, at most `capacity` of them,
/// with the MAE and position of the worst one.
#[derive(Debug)]
pub(crate) struct MemberPool {
    capacity: usize,
    members: Vec<EnsembleMember>,
    highest_mae: f64,
    highest_mae_idx: usize,
}


impl MemberPool {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            members: Vec::with_capacity(capacity),
            highest_mae: 0.0,
            highest_mae_idx: 0,
        }
    }


    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }


    pub(crate) fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }


    /// An MAE above this value is recorded as rejected.
    /// No member is rejected before the pool is full.
    pub(crate) fn threshold(&self) -> f64 {
        if self.is_full() { self.highest_mae } else { REJECTED_MAE }
    }


    /// MAE and position of the worst member.
    pub(crate) fn worst(&self) -> (f64, usize) {
        (self.highest_mae, self.highest_mae_idx)
    }


    /// Adds `member` while the pool has room.
    /// Once full, `member` replaces the worst member
    /// if its MAE is strictly lower, and the worst member is searched again.
    /// Returns `true` if `member` was kept.
    pub(crate) fn offer(&mut self, member: EnsembleMember) -> bool {
        if !self.is_full() {
            if member.mae > self.highest_mae {
                self.highest_mae = member.mae;
                self.highest_mae_idx = self.members.len();
            }
            self.members.push(member);
            true
        } else if member.mae < self.highest_mae {
            self.members[self.highest_mae_idx] = member;
            (self.highest_mae, self.highest_mae_idx)
                = worst_member(&self.members);
            true
        } else {
            false
        }
    }


    pub(crate) fn into_members(self) -> Vec<EnsembleMember> {
        self.members
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SeriesCollection;

    #[test]
    fn test_weight_is_decreasing() {
        let maes = [0.0, 0.1, 0.5, 1.0, 2.0, 10.0];
        for pair in maes.windows(2) {
            assert!(member_weight(pair[0]) > member_weight(pair[1]));
        }
        assert_eq!(member_weight(0.0), 1.0);
        assert_eq!(member_weight(1.0), 1.0 / 16.0);
    }

    #[test]
    fn test_weight_floor() {
        assert_eq!(member_weight(1e6), MIN_MEMBER_WEIGHT);
    }

    fn record(mae: f64) -> EnsembleMember {
        EnsembleMember {
            classifier: IndividualOrdinalTde::new(ParameterVector::default()),
            params: ParameterVector::default(),
            weight: member_weight(mae),
            subsample: vec![0, 1],
            mae,
            train_predictions: None,
        }
    }

    #[test]
    fn test_worst_member() {
        let members = vec![record(0.2), record(0.7), record(0.7), record(0.1)];
        assert_eq!(worst_member(&members), (0.7, 1));
        assert_eq!(worst_member(&[record(0.0)]), (0.0, 0));
    }

    #[test]
    fn test_pool_replaces_the_worst_member() {
        let mut pool = MemberPool::new(3);
        assert_eq!(pool.threshold(), REJECTED_MAE);
        for mae in [0.2, 0.7, 0.5] {
            assert!(pool.offer(record(mae)));
        }
        assert!(pool.is_full());
        assert_eq!(pool.worst(), (0.7, 1));
        assert_eq!(pool.threshold(), 0.7);

        // A strictly better member takes the place of the worst one
        // and the next worst is found.
        assert!(pool.offer(record(0.1)));
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.worst(), (0.5, 2));
        assert_eq!(pool.threshold(), 0.5);

        // Ties and worse members are not kept.
        assert!(!pool.offer(record(0.5)));
        assert!(!pool.offer(record(REJECTED_MAE)));

        let maes = pool.into_members()
            .iter()
            .map(|m| m.mae)
            .collect::<Vec<_>>();
        assert_eq!(maes, vec![0.2, 0.1, 0.5]);
    }

    /// Identical constant series, so every leave-one-out search
    /// returns the first other case of the subsample.
    fn constant_member(labels: &[i64]) -> IndividualOrdinalTde {
        let series = vec![vec![1.0; 20]; labels.len()];
        let x = SeriesCollection::from_univariate(series).unwrap();
        let mut classifier = IndividualOrdinalTde::new(ParameterVector::default());
        classifier.fit_with(&x, labels, &JobPool::sequential()).unwrap();
        classifier
    }

    #[test]
    fn test_evaluate_caps_mae_above_threshold() {
        let labels = [0, 1, 2, 0, 1, 2];
        let classifier = constant_member(&labels);
        let pool = JobPool::sequential();

        let (mae, predictions) = evaluate(
            &classifier, &labels, REJECTED_MAE, &pool
        ).unwrap();
        assert_eq!(predictions, vec![1, 0, 0, 0, 0, 0]);
        assert!((mae - 7.0 / 6.0).abs() < 1e-12);

        let (mae, predictions) = evaluate(
            &classifier, &labels, 0.5, &pool
        ).unwrap();
        assert_eq!(mae, REJECTED_MAE);
        assert_eq!(predictions, vec![1, 0, 0, 0, 0, 0]);
    }
}
