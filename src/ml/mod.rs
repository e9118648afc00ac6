//! Machine learning: kernel SVM and evaluation metrics

pub mod metrics;
pub mod svm;

pub use metrics::Metrics;
pub use svm::{rbf_gram, Kernel, SvmClassifier};
