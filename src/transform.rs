//! Symbolic transforms of time series into bags of words.

pub(crate) mod word_bag;
pub(crate) mod dft;
pub(crate) mod binning;
pub(crate) mod sfa;


pub use word_bag::{WordKey, WordBag, histogram_intersection, bag_total};
pub use binning::{BinningMethod, Breakpoints};
pub use sfa::{Sfa, SymbolicTransform};
