//! Covariant quantum feature map
//!
//! Encodes a standardized feature vector of even length 2n into an n-qubit
//! state. The circuit is a trainable single-qubit Ry(theta) layer, CZ
//! entanglers over adjacent qubit pairs, then the data-encoding layer
//! Rz(x[2q+1]) Rx(x[2q]) on each qubit q, so adjacent feature pairs share a
//! qubit.

use super::state::StateVector;
use crate::data::error::{PipelineError, PipelineResult};

/// Parameterized covariant feature map.
#[derive(Debug, Clone)]
pub struct CovariantFeatureMap {
    n_qubits: usize,
    entangler_map: Vec<(usize, usize)>,
}

impl CovariantFeatureMap {
    /// Build a feature map for `feature_dimension` features (must be even).
    ///
    /// The entangler map links adjacent qubits: (i, i+1) for i < n_qubits-1.
    pub fn new(feature_dimension: usize) -> PipelineResult<Self> {
        if feature_dimension == 0 || feature_dimension % 2 != 0 {
            return Err(PipelineError::EmptyInput(format!(
                "feature dimension must be even and positive, got {}",
                feature_dimension
            )));
        }
        let n_qubits = feature_dimension / 2;
        let entangler_map = (0..n_qubits.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Ok(Self {
            n_qubits,
            entangler_map,
        })
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Number of trainable parameters (one Ry angle per qubit).
    pub fn n_parameters(&self) -> usize {
        self.n_qubits
    }

    pub fn feature_dimension(&self) -> usize {
        self.n_qubits * 2
    }

    /// Entangled qubit pairs, in application order.
    pub fn entangler_map(&self) -> &[(usize, usize)] {
        &self.entangler_map
    }

    /// Prepare the state for feature vector `x` under parameters `theta`.
    pub fn prepare(&self, x: &[f64], theta: &[f64]) -> PipelineResult<StateVector> {
        if x.len() != self.feature_dimension() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.feature_dimension(),
                got: x.len(),
                context: "feature vector length".to_string(),
            });
        }
        if theta.len() != self.n_parameters() {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_parameters(),
                got: theta.len(),
                context: "parameter vector length".to_string(),
            });
        }

        let mut state = StateVector::zero(self.n_qubits);
        for (q, &angle) in theta.iter().enumerate() {
            state.ry(q, angle);
        }
        for &(a, b) in &self.entangler_map {
            state.cz(a, b);
        }
        for q in 0..self.n_qubits {
            state.rz(q, x[2 * q + 1]);
            state.rx(q, x[2 * q]);
        }
        Ok(state)
    }
}
