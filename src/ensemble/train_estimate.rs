//! In-sample estimates of the ensemble.
use serde::{Deserialize, Deserializer, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::TdeError;


/// How `fit_predict_proba` estimates the training cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainEstimateMethod {
    /// Leave-one-out predictions of the members
    /// whose subsample contains the case.
    #[default]
    Loocv,
    /// Predictions of the members
    /// whose subsample does not contain the case.
    Oob,
}


impl FromStr for TrainEstimateMethod {
    type Err = TdeError;

    /// Parses `"loocv"` or `"oob"`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "loocv" => Ok(Self::Loocv),
            "oob" => Ok(Self::Oob),
            _ => Err(TdeError::Config(format!(
                "invalid train_estimate_method {s:?}. \
                available options: loocv, oob"
            ))),
        }
    }
}


impl<'de> Deserialize<'de> for TrainEstimateMethod {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}


impl fmt::Display for TrainEstimateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loocv => write!(f, "loocv"),
            Self::Oob => write!(f, "oob"),
        }
    }
}


/// Accumulates weighted votes per case.
/// Rows without any vote become uniform.
#[derive(Debug, Clone)]
pub(crate) struct VoteTable {
    sums: Vec<Vec<f64>>,
    divisors: Vec<f64>,
}


impl VoteTable {
    pub(crate) fn new(n_cases: usize, n_classes: usize) -> Self {
        Self {
            sums: vec![vec![0f64; n_classes]; n_cases],
            divisors: vec![0f64; n_cases],
        }
    }


    #[inline]
    pub(crate) fn vote(&mut self, case: usize, class: usize, weight: f64) {
        self.sums[case][class] += weight;
        self.divisors[case] += weight;
    }


    pub(crate) fn into_probas(self) -> Vec<Vec<f64>> {
        self.sums.into_iter()
            .zip(self.divisors)
            .map(|(mut row, divisor)| {
                if divisor == 0.0 {
                    let uniform = 1.0 / row.len() as f64;
                    row.iter_mut().for_each(|p| *p = uniform);
                } else {
                    row.iter_mut().for_each(|p| *p /= divisor);
                }
                row
            })
            .collect()
    }
}
