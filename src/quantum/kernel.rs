//! Fidelity quantum kernel
//!
//! K(x, y) = |<phi(x)|phi(y)>|^2 with phi the covariant feature map under the
//! current parameters. Statevectors are prepared once per sample and reused
//! across the Gram matrix.

use super::feature_map::CovariantFeatureMap;
use super::state::StateVector;
use crate::data::error::PipelineResult;
use ndarray::{Array2, Axis};

/// Quantum kernel over a parameterized feature map.
#[derive(Debug, Clone)]
pub struct QuantumKernel {
    feature_map: CovariantFeatureMap,
}

impl QuantumKernel {
    pub fn new(feature_map: CovariantFeatureMap) -> Self {
        Self { feature_map }
    }

    pub fn feature_map(&self) -> &CovariantFeatureMap {
        &self.feature_map
    }

    fn states(&self, x: &Array2<f64>, theta: &[f64]) -> PipelineResult<Vec<StateVector>> {
        x.axis_iter(Axis(0))
            .map(|row| {
                let row = row.to_vec();
                self.feature_map.prepare(&row, theta)
            })
            .collect()
    }

    /// Symmetric Gram matrix over the rows of `x`.
    pub fn evaluate_symmetric(
        &self,
        x: &Array2<f64>,
        theta: &[f64],
    ) -> PipelineResult<Array2<f64>> {
        let states = self.states(x, theta)?;
        let n = states.len();
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            k[[i, i]] = 1.0;
            for j in (i + 1)..n {
                let f = states[i].fidelity(&states[j]);
                k[[i, j]] = f;
                k[[j, i]] = f;
            }
        }
        Ok(k)
    }

    /// Rectangular kernel matrix between the rows of `a` and `b`
    /// (n_a x n_b); used for test-vs-train evaluation.
    pub fn evaluate(
        &self,
        a: &Array2<f64>,
        b: &Array2<f64>,
        theta: &[f64],
    ) -> PipelineResult<Array2<f64>> {
        let a_states = self.states(a, theta)?;
        let b_states = self.states(b, theta)?;
        let mut k = Array2::zeros((a_states.len(), b_states.len()));
        for (i, sa) in a_states.iter().enumerate() {
            for (j, sb) in b_states.iter().enumerate() {
                k[[i, j]] = sa.fidelity(sb);
            }
        }
        Ok(k)
    }
}
