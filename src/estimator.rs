//! The estimator protocol:
//! capabilities, input checks, job-count resolution,
//! and the `Classifier` trait.

pub(crate) mod capabilities;
pub(crate) mod jobs;
pub(crate) mod classifier;


pub use capabilities::{Capabilities, check_collection};
pub use jobs::{JobPool, resolve_n_jobs};
pub use classifier::{Estimator, Classifier};

pub(crate) use classifier::{
    check_fit_input,
    check_predict_input,
    unique_classes,
    class_index,
};
