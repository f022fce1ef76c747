use serde::{Serialize, Deserialize};

use crate::error::{Result, TdeError};
use crate::sample::CollectionMetadata;


/// What an estimator can do.
/// Each estimator returns a fixed value of this struct;
/// there is no runtime lookup by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Accepts cases with more than one channel.
    pub multivariate: bool,
    /// Accepts `NaN` values.
    pub missing_values: bool,
    /// Runs parts of `fit`/`predict` on a worker pool.
    pub multithreading: bool,
    /// Provides in-sample estimates through `fit_predict_proba`.
    pub train_estimate: bool,
    /// Supports a build time contract.
    pub contractable: bool,
}


/// Rejects a collection that needs a capability `capabilities` lacks.
pub fn check_collection(
    estimator: &'static str,
    capabilities: &Capabilities,
    metadata: &CollectionMetadata,
) -> Result<()>
{
    let missing = metadata.missing_values && !capabilities.missing_values;
    let multivariate = metadata.multivariate && !capabilities.multivariate;

    let reason = match (missing, multivariate) {
        (true, true) => "missing values or multivariate",
        (true, false) => "missing values",
        (false, true) => "multivariate",
        (false, false) => return Ok(()),
    };

    Err(TdeError::Capability { estimator, reason: reason.to_string(), })
}
