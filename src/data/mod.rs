//! Data structures and utilities for strain data

pub mod error;
pub mod loader;
pub mod types;
pub mod windows;

pub use error::{DataError, DataResult, PipelineError, PipelineResult};
pub use loader::SeriesLoader;
pub use types::{Dataset, StrainSeries, Window};
pub use windows::{BoundsPolicy, Windower};
