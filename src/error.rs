//! Defines the error type returned by every fallible operation
//! of this crate.
use thiserror::Error;

/// Errors raised by the estimators, the transform, and the reader.
#[derive(Debug, Error)]
pub enum TdeError {
    /// Invalid estimator configuration.
    /// Raised immediately and never retried.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// `predict` or `predict_proba` called before `fit`.
    #[error("{estimator} is not fitted yet; call `fit` before `{operation}`")]
    NotFitted {
        /// Name of the estimator.
        estimator: &'static str,
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// Malformed input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The input requires a capability the estimator does not have.
    #[error("{estimator} cannot handle {reason}")]
    Capability {
        /// Name of the estimator.
        estimator: &'static str,
        /// Missing capability, e.g. `missing values`.
        reason: String,
    },

    /// A data file could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A linear system of the surrogate could not be solved.
    #[error("numerical error: {0}")]
    Numerical(String),

    /// I/O failure while reading data or configuration.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON configuration or model.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The worker pool could not be built.
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Shorthand for `std::result::Result<T, TdeError>`.
pub type Result<T> = std::result::Result<T, TdeError>;
