use serde::{Serialize, Deserialize};

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::constants::*;
use crate::error::{Result, TdeError};
use super::train_estimate::TrainEstimateMethod;


/// The configuration of an [`OrdinalTde`](super::OrdinalTde).
///
/// Missing fields of a JSON document take their default value.
/// ```text
/// n_parameter_samples: 250,
/// max_ensemble_size: 50,
/// max_win_len_prop: 1.0,
/// min_window: 10,
/// randomly_selected_params: 50,
/// bigrams: None,
/// dim_threshold: 0.85,
/// max_dims: 20,
/// time_limit_in_minutes: 0.0,
/// contract_max_n_parameter_samples: None,
/// flat_channel_keys: false,
/// train_estimate_method: "loocv",
/// n_jobs: Some(1),
/// random_state: None,
/// verbose: false,
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdinalTdeConfig {
    /// Number of parameter vectors evaluated
    /// when no time contract is set.
    pub n_parameter_samples: usize,
    /// Maximum number of retained members.
    pub max_ensemble_size: usize,
    /// Maximum window length as a proportion of the series length.
    pub max_win_len_prop: f64,
    /// Minimum window length.
    pub min_window: usize,
    /// Number of uniformly drawn parameter vectors
    /// before the surrogate model proposes them.
    pub randomly_selected_params: usize,
    /// Count word bigrams.
    /// `None` uses bigrams for univariate data only.
    pub bigrams: Option<bool>,
    /// Channel acceptance threshold of multivariate members.
    pub dim_threshold: f64,
    /// Maximum number of channels per member.
    pub max_dims: usize,
    /// Build time contract. `0` disables it.
    pub time_limit_in_minutes: f64,
    /// Maximum number of parameter vectors under a time contract.
    pub contract_max_n_parameter_samples: Option<usize>,
    /// Pack multivariate keys into plain integer words.
    pub flat_channel_keys: bool,
    /// In-sample estimate of `fit_predict_proba`.
    pub train_estimate_method: TrainEstimateMethod,
    /// Number of workers. Negative values count back from
    /// the number of processors.
    pub n_jobs: Option<isize>,
    /// Seed of every random draw.
    pub random_state: Option<u64>,
    /// Print the search progress to the console.
    pub verbose: bool,
}


impl Default for OrdinalTdeConfig {
    fn default() -> Self {
        Self {
            n_parameter_samples: DEFAULT_N_PARAMETER_SAMPLES,
            max_ensemble_size: DEFAULT_MAX_ENSEMBLE_SIZE,
            max_win_len_prop: DEFAULT_MAX_WIN_LEN_PROP,
            min_window: DEFAULT_MIN_WINDOW,
            randomly_selected_params: DEFAULT_RANDOMLY_SELECTED_PARAMS,
            bigrams: None,
            dim_threshold: DEFAULT_DIM_THRESHOLD,
            max_dims: DEFAULT_MAX_DIMS,
            time_limit_in_minutes: 0.0,
            contract_max_n_parameter_samples: None,
            flat_channel_keys: false,
            train_estimate_method: TrainEstimateMethod::Loocv,
            n_jobs: Some(1),
            random_state: None,
            verbose: false,
        }
    }
}


impl OrdinalTdeConfig {
    /// Parses a JSON document.
    /// Values of the wrong type or an unknown train estimate method
    /// are configuration errors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| {
                if e.is_data() {
                    TdeError::Config(e.to_string())
                } else {
                    TdeError::Json(e)
                }
            })
    }


    /// Reads a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }


    /// Checks the numeric settings.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| -> Result<()> {
            Err(TdeError::Config(message))
        };

        if self.max_ensemble_size == 0 {
            return fail("max_ensemble_size must be positive".into());
        }
        if self.min_window == 0 {
            return fail("min_window must be positive".into());
        }
        if !(self.max_win_len_prop > 0.0 && self.max_win_len_prop <= 1.0) {
            return fail(format!(
                "max_win_len_prop must be in (0, 1]. got {}",
                self.max_win_len_prop
            ));
        }
        if !(0.0..=1.0).contains(&self.dim_threshold) {
            return fail(format!(
                "dim_threshold must be in [0, 1]. got {}",
                self.dim_threshold
            ));
        }
        if self.max_dims == 0 {
            return fail("max_dims must be positive".into());
        }
        if !(self.time_limit_in_minutes.is_finite()
            && self.time_limit_in_minutes >= 0.0)
        {
            return fail(format!(
                "time_limit_in_minutes must be a non-negative number. got {}",
                self.time_limit_in_minutes
            ));
        }
        self.time_limit()?;
        if self.time_limit_in_minutes == 0.0 && self.n_parameter_samples == 0 {
            return fail(
                "n_parameter_samples must be positive without a time contract"
                    .into()
            );
        }
        if self.time_limit_in_minutes > 0.0
            && self.contract_max_n_parameter_samples == Some(0)
        {
            return fail(
                "contract_max_n_parameter_samples must be positive".into()
            );
        }
        Ok(())
    }


    /// The build time contract. `None` when disabled.
    pub fn time_limit(&self) -> Result<Option<Duration>> {
        if self.time_limit_in_minutes == 0.0 {
            return Ok(None);
        }
        Duration::try_from_secs_f64(self.time_limit_in_minutes * 60.0)
            .map(Some)
            .map_err(|_| TdeError::Config(format!(
                "time_limit_in_minutes {} is not a representable duration",
                self.time_limit_in_minutes
            )))
    }
}
