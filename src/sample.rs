//! Struct `SeriesCollection` represents a batch of time series.

// Provides the collection struct.
pub(crate) mod series_collection;
// Provides the summary used for capability checks.
pub(crate) mod metadata;
// Provides a struct that reads a file.
pub(crate) mod reader;


pub use series_collection::SeriesCollection;
pub use metadata::CollectionMetadata;
pub use reader::{SeriesReader, read_ts};
