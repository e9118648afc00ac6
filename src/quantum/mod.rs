//! Quantum kernel machinery: simulator, feature map, kernel, training

pub mod feature_map;
pub mod kernel;
pub mod spsa;
pub mod state;
pub mod trainer;

pub use feature_map::CovariantFeatureMap;
pub use kernel::QuantumKernel;
pub use spsa::{SpsaConfig, SpsaResult};
pub use state::StateVector;
pub use trainer::{QuantumKernelTrainer, SvcAlignmentLoss, TrainedKernel};
