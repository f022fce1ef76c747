#![warn(missing_docs)]

//!
//! A crate that provides the Ordinal Temporal Dictionary Ensemble (O-TDE),
//! a dictionary-based classifier for time series with ordinal labels.
//!
//! O-TDE turns every series into a bag of symbolic words
//! with the Symbolic Fourier Approximation (SFA)
//! and classifies by 1-nearest-neighbor under the histogram intersection.
//! An ensemble of such classifiers is built by a parameter search
//! that starts uniformly at random and is then guided by
//! a kernel ridge surrogate of the member error.
//!
//! - [`OrdinalTde`]
//!     The ensemble. Keeps the members with the lowest
//!     leave-one-out mean absolute error and votes with weights
//!     `(1 / (1 + MAE))^4`.
//!     Provides in-sample estimates through
//!     [`OrdinalTde::fit_predict_proba`].
//!
//! - [`IndividualOrdinalTde`]
//!     One member. Handles multivariate series
//!     by selecting channels and tagging words with their channel.
//!
//! ```no_run
//! use ordinal_tde::prelude::*;
//!
//! let (x, y) = SeriesReader::default()
//!     .file("train.ts")
//!     .read()
//!     .unwrap();
//!
//! let mut clf = OrdinalTde::init()
//!     .n_parameter_samples(100)
//!     .max_ensemble_size(20)
//!     .n_jobs(Some(-1))
//!     .random_state(Some(0));
//!
//! let probas = clf.fit_predict_proba(&x, &y).unwrap();
//! println!("{:?}", &probas[..3]);
//! ```

pub mod constants;
pub mod error;
pub mod sample;
pub mod estimator;
pub mod transform;
pub mod dictionary;
pub mod ensemble;
pub mod research;

pub mod prelude;


pub use error::{TdeError, Result};

pub use sample::{
    SeriesCollection,
    CollectionMetadata,
    SeriesReader,
    read_ts,
};

pub use estimator::{
    Capabilities,
    Estimator,
    Classifier,
    JobPool,
    check_collection,
    resolve_n_jobs,
};

pub use transform::{
    WordKey,
    WordBag,
    BinningMethod,
    Breakpoints,
    Sfa,
    SymbolicTransform,
    histogram_intersection,
    bag_total,
};

pub use dictionary::{
    ParameterVector,
    IndividualOrdinalTde,
};

pub use ensemble::{
    OrdinalTde,
    OrdinalTdeConfig,
    EnsembleMember,
    TrainEstimateMethod,
    member_weight,
};

pub use research::{
    SearchLogger,
    mean_absolute_error,
    error_rate,
};
