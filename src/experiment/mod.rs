//! Experiment orchestration
//!
//! Wires the pipeline together: per-event loading and preprocessing, training
//! set assembly, feature pipeline fitting, both classifiers, and the sweep
//! over the noise-scale parameter.

pub mod sweep;

pub use sweep::{run_sweep, EventWindows, SweepOutcome};

use crate::data::windows::BoundsPolicy;
use crate::quantum::SpsaConfig;
use std::path::PathBuf;

/// Seconds of strain fetched before the integer event GPS time
pub const SEGMENT_BEFORE: i64 = 2;
/// Seconds of strain fetched after the integer event GPS time
pub const SEGMENT_AFTER: i64 = 10;
/// Test segment duration after the 1 s edge crops
pub const TEST_SEGMENT_SECONDS: f64 = 10.0;
/// Duration of background noise consumed per training event
pub const TRAIN_NOISE_SECONDS: f64 = 25.0;

/// One value of the sweep parameter: file identifier plus display label.
#[derive(Debug, Clone)]
pub struct SweepValue {
    /// Identifier embedded in the simulated-signal filenames (e.g. "s0.01")
    pub noise_scale: String,
    /// Display label used in plots (e.g. "1E-2")
    pub legend: String,
}

impl SweepValue {
    pub fn new(noise_scale: &str, legend: &str) -> Self {
        Self {
            noise_scale: noise_scale.to_string(),
            legend: legend.to_string(),
        }
    }
}

/// Full experiment configuration.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Real events evaluated as test sets
    pub events: Vec<String>,
    /// Events whose background noise seeds the training set
    pub train_events: Vec<String>,
    /// Sweep values, in execution order
    pub sweep: Vec<SweepValue>,
    /// Detector whose strain is analyzed
    pub detector: String,
    /// SVM box constraint
    pub c: f64,
    /// RBF kernel width
    pub gamma: f64,
    /// Quantum kernel optimizer schedule
    pub optimizer: SpsaConfig,
    /// Directory holding the simulated-signal and background-noise files
    pub data_dir: PathBuf,
    /// Strain segment cache directory
    pub cache_dir: PathBuf,
    /// Output directory for plots and CSV
    pub out_dir: PathBuf,
    /// Windowing edge policy for the test segments
    pub bounds_policy: WindowBounds,
    /// Component-mass grid of the simulated signals: (m1_start, m2_start, n)
    pub mass_grid: (u32, u32, u32),
}

/// Edge policy choice exposed in configuration.
///
/// `Fixed` reproduces the original fixed-iteration windowing (count derived
/// from the nominal segment duration); `ToEnd` stops at the last full window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowBounds {
    Fixed,
    ToEnd,
}

impl WindowBounds {
    /// Resolve to a concrete policy for a segment of `seconds` at
    /// `sample_rate`, given window/hop lengths in samples.
    pub fn resolve(self, seconds: f64, sample_rate: f64, window_len: usize, hop: usize) -> BoundsPolicy {
        match self {
            WindowBounds::Fixed => {
                let total = (seconds * sample_rate).round() as usize;
                let count = if total < window_len {
                    0
                } else {
                    (total - window_len) / hop + 1
                };
                BoundsPolicy::FixedCount(count)
            }
            WindowBounds::ToEnd => BoundsPolicy::ToEnd,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            events: [
                "GW150914", "GW151012", "GW151226", "GW170814", "GW170823", "GW170729",
                "GW170104", "GW170608", "GW170809", "GW170817", "GW170818",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            train_events: vec!["GW150914".to_string()],
            sweep: vec![
                SweepValue::new("s0.1", "1E-1"),
                SweepValue::new("s0.01", "1E-2"),
                SweepValue::new("s0.005", "5E-3"),
                SweepValue::new("s0.001", "1E-3"),
                SweepValue::new("s0.0005", "5E-4"),
                SweepValue::new("s0.0001", "1E-4"),
            ],
            detector: "H1".to_string(),
            c: 2.0,
            gamma: 1.0,
            optimizer: SpsaConfig::default(),
            data_dir: PathBuf::from("training_data"),
            cache_dir: PathBuf::from("strain_cache"),
            out_dir: PathBuf::from("results"),
            bounds_policy: WindowBounds::Fixed,
            mass_grid: (31, 23, 10),
        }
    }
}
