//! # gw_classify - Gravitational-Wave Window Classification
//!
//! Research pipeline comparing a classical RBF-kernel SVM against a
//! quantum-kernel SVM for detecting gravitational-wave signal windows in
//! LIGO strain data:
//!
//! - Strain fetching and caching from public open data
//! - Band-pass/notch preprocessing (zero-phase)
//! - Overlapping tapered windows labeled by event time
//! - Temporal feature extraction, selection and standardization
//! - RBF SVM and trained-quantum-kernel SVM, scored by balanced accuracy
//! - Sweep over a noise-scale parameter with plotted comparisons

pub mod api;
pub mod data;
pub mod dsp;
pub mod experiment;
pub mod features;
pub mod ml;
pub mod quantum;
pub mod report;

pub use api::GwoscClient;
pub use data::types::{Dataset, StrainSeries, Window};
pub use data::windows::{BoundsPolicy, Windower};
pub use experiment::{ExperimentConfig, SweepOutcome};
pub use features::{FeaturePipeline, TemporalExtractor};
pub use ml::{Kernel, Metrics, SvmClassifier};
pub use quantum::{CovariantFeatureMap, QuantumKernel, QuantumKernelTrainer};
