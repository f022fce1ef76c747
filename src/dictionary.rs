//! Dictionary classifiers:
//! the single ensemble member and its building blocks.

pub(crate) mod parameters;
pub(crate) mod nearest_neighbor;
pub(crate) mod channel_selection;
pub(crate) mod individual;


pub use parameters::ParameterVector;
pub use individual::IndividualOrdinalTde;
