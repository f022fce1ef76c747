//! The ensemble controller:
//! parameter search, member pool, and weighted voting.

pub(crate) mod config;
pub(crate) mod member;
pub(crate) mod search_space;
pub(crate) mod surrogate;
pub(crate) mod train_estimate;
pub(crate) mod ordinal_tde;


pub use config::OrdinalTdeConfig;
pub use member::{EnsembleMember, member_weight};
pub use train_estimate::TrainEstimateMethod;
pub use ordinal_tde::OrdinalTde;
