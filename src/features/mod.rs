//! Feature extraction and selection

pub mod pipeline;
pub mod temporal;

pub use pipeline::{correlated_columns, duplicate_last_column, FeaturePipeline};
pub use temporal::TemporalExtractor;
