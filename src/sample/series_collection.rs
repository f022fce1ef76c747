use serde::{Serialize, Deserialize};

use crate::error::{Result, TdeError};
use super::metadata::CollectionMetadata;


/// An equal-length collection of (possibly multivariate) time series.
///
/// Each case is a `n_channels × n_timepoints` block.
/// The values are stored flat in case-major, then channel-major order,
/// so the series of channel `c` of case `i` lives at
/// `values[(i * n_channels + c) * n_timepoints..][..n_timepoints]`.
///
/// A collection is immutable once built.
/// Missing values are stored as `f64::NAN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesCollection {
    values: Vec<f64>,
    n_cases: usize,
    n_channels: usize,
    n_timepoints: usize,
}


impl SeriesCollection {
    /// Build a collection from flat values.
    /// Returns `Err` if the shape does not match the number of values
    /// or if any dimension is zero.
    pub fn from_flat(
        values: Vec<f64>,
        n_cases: usize,
        n_channels: usize,
        n_timepoints: usize,
    ) -> Result<Self>
    {
        if n_cases == 0 || n_channels == 0 || n_timepoints == 0 {
            return Err(TdeError::InvalidInput(format!(
                "a collection must have at least one case, channel, \
                and timepoint. got shape ({n_cases}, {n_channels}, {n_timepoints})"
            )));
        }

        let expected = n_cases * n_channels * n_timepoints;
        if values.len() != expected {
            return Err(TdeError::InvalidInput(format!(
                "shape ({n_cases}, {n_channels}, {n_timepoints}) \
                needs {expected} values. got {}",
                values.len()
            )));
        }

        Ok(Self { values, n_cases, n_channels, n_timepoints, })
    }


    /// Build a collection from nested vectors
    /// indexed as `cases[case][channel][timepoint]`.
    /// Every case must have the same number of channels
    /// and every series the same length.
    pub fn from_cases(cases: Vec<Vec<Vec<f64>>>) -> Result<Self> {
        let n_cases = cases.len();
        let n_channels = cases.first().map_or(0, |case| case.len());
        let n_timepoints = cases.first()
            .and_then(|case| case.first())
            .map_or(0, |series| series.len());

        let mut values = Vec::with_capacity(
            n_cases * n_channels * n_timepoints
        );
        for (i, case) in cases.into_iter().enumerate() {
            if case.len() != n_channels {
                return Err(TdeError::InvalidInput(format!(
                    "case {i} has {} channels, expected {n_channels}",
                    case.len()
                )));
            }
            for (c, series) in case.into_iter().enumerate() {
                if series.len() != n_timepoints {
                    return Err(TdeError::InvalidInput(format!(
                        "series of case {i}, channel {c} has length {}, \
                        expected {n_timepoints}. \
                        unequal length series are not supported",
                        series.len()
                    )));
                }
                values.extend(series);
            }
        }

        Self::from_flat(values, n_cases, n_channels, n_timepoints)
    }


    /// Build a univariate collection, one series per case.
    pub fn from_univariate(series: Vec<Vec<f64>>) -> Result<Self> {
        let cases = series.into_iter()
            .map(|s| vec![s])
            .collect();
        Self::from_cases(cases)
    }


    /// Returns `(n_cases, n_channels, n_timepoints)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.n_cases, self.n_channels, self.n_timepoints)
    }


    /// Number of cases.
    #[inline]
    pub fn n_cases(&self) -> usize {
        self.n_cases
    }


    /// Number of channels per case.
    #[inline]
    pub fn n_channels(&self) -> usize {
        self.n_channels
    }


    /// Length of every series.
    #[inline]
    pub fn n_timepoints(&self) -> usize {
        self.n_timepoints
    }


    /// The series of the given channel of the given case.
    ///
    /// # Panics
    /// Panics if `case` or `channel` is out of range.
    #[inline]
    pub fn series(&self, case: usize, channel: usize) -> &[f64] {
        assert!(case < self.n_cases && channel < self.n_channels);
        let start = (case * self.n_channels + channel) * self.n_timepoints;
        &self.values[start..start + self.n_timepoints]
    }


    /// All channels of the given case, channel-major.
    #[inline]
    pub fn case(&self, case: usize) -> &[f64] {
        let width = self.n_channels * self.n_timepoints;
        &self.values[case * width..(case + 1) * width]
    }


    /// Returns a new collection holding the given cases in the given order.
    /// Indices may repeat.
    ///
    /// # Panics
    /// Panics if an index is out of range.
    pub fn select(&self, indices: &[usize]) -> Self {
        let width = self.n_channels * self.n_timepoints;
        let mut values = Vec::with_capacity(indices.len() * width);
        for &i in indices {
            values.extend_from_slice(self.case(i));
        }

        Self {
            values,
            n_cases: indices.len(),
            n_channels: self.n_channels,
            n_timepoints: self.n_timepoints,
        }
    }


    /// Returns the univariate collection made of one channel.
    ///
    /// # Panics
    /// Panics if `channel` is out of range.
    pub fn channel(&self, channel: usize) -> Self {
        let mut values = Vec::with_capacity(self.n_cases * self.n_timepoints);
        for i in 0..self.n_cases {
            values.extend_from_slice(self.series(i, channel));
        }

        Self {
            values,
            n_cases: self.n_cases,
            n_channels: 1,
            n_timepoints: self.n_timepoints,
        }
    }


    /// Returns `true` if any value is `NaN`.
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }


    /// Summarizes the collection.
    pub fn metadata(&self) -> CollectionMetadata {
        CollectionMetadata {
            n_cases: self.n_cases,
            n_channels: self.n_channels,
            n_timepoints: self.n_timepoints,
            multivariate: self.n_channels > 1,
            missing_values: self.has_missing(),
        }
    }
}
