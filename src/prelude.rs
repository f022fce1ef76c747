//! Exports the estimators, the data types, and the traits.
//!
pub use crate::ensemble::{
    // The ensemble
    OrdinalTde,
    OrdinalTdeConfig,
    EnsembleMember,
    TrainEstimateMethod,
};


pub use crate::dictionary::{
    // Ensemble members
    IndividualOrdinalTde,
    ParameterVector,
};


pub use crate::transform::{
    // Symbolic transform
    Sfa,
    SymbolicTransform,
    BinningMethod,


    // Word bags
    WordKey,
    WordBag,
    histogram_intersection,
};


pub use crate::estimator::{
    Estimator,
    Classifier,
    Capabilities,
};


pub use crate::sample::{
    SeriesCollection,
    SeriesReader,
};


pub use crate::research::{
    SearchLogger,
    mean_absolute_error,
    error_rate,
};


pub use crate::error::TdeError;
