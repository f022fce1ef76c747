//! Tools for experiments with the ensemble:
//! console progress of the parameter search
//! and loss functions over ordinal labels.

/// Prints the search progress.
pub mod logger;

/// Defines loss functions (e.g., zero-one loss, absolute loss).
pub mod loss_functions;


pub use logger::SearchLogger;

pub use loss_functions::{
    zero_one_loss,
    absolute_loss,
    mean_absolute_error,
    error_rate,
};
