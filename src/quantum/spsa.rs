//! SPSA: simultaneous perturbation stochastic approximation
//!
//! Gradient-free minimizer used for the kernel parameters. Each iteration
//! perturbs all parameters at once along a random +-1 direction and estimates
//! the gradient from two loss evaluations, so the cost per step is constant
//! in the parameter count. The schedule is deliberately plain: fixed
//! iteration count, constant learning rate and perturbation size.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// SPSA configuration.
#[derive(Debug, Clone)]
pub struct SpsaConfig {
    /// Number of iterations
    pub max_iter: usize,
    /// Step size applied to the gradient estimate
    pub learning_rate: f64,
    /// Magnitude of the +-1 perturbation
    pub perturbation: f64,
    /// RNG seed for the perturbation directions
    pub seed: u64,
}

impl Default for SpsaConfig {
    fn default() -> Self {
        Self {
            max_iter: 300,
            learning_rate: 0.02,
            perturbation: 0.02,
            seed: 12345,
        }
    }
}

/// Result of an SPSA run.
#[derive(Debug, Clone)]
pub struct SpsaResult {
    /// Final parameter vector
    pub point: Vec<f64>,
    /// Loss trajectory, one entry per iteration (mean of the two perturbed
    /// evaluations that iteration computed)
    pub losses: Vec<f64>,
}

/// Minimize `loss` starting from `initial`.
pub fn minimize<F>(config: &SpsaConfig, initial: &[f64], mut loss: F) -> SpsaResult
where
    F: FnMut(&[f64]) -> f64,
{
    let mut theta = initial.to_vec();
    let mut losses = Vec::with_capacity(config.max_iter);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let c = config.perturbation;

    let mut plus = vec![0.0; theta.len()];
    let mut minus = vec![0.0; theta.len()];

    for _ in 0..config.max_iter {
        let delta: Vec<f64> = (0..theta.len())
            .map(|_| if rng.gen_bool(0.5) { 1.0 } else { -1.0 })
            .collect();

        for (k, (&t, &d)) in theta.iter().zip(delta.iter()).enumerate() {
            plus[k] = t + c * d;
            minus[k] = t - c * d;
        }

        let l_plus = loss(&plus);
        let l_minus = loss(&minus);
        let g = (l_plus - l_minus) / (2.0 * c);

        // delta entries are +-1, so dividing by delta_k equals multiplying
        for (t, &d) in theta.iter_mut().zip(delta.iter()) {
            *t -= config.learning_rate * g * d;
        }

        losses.push((l_plus + l_minus) / 2.0);
    }

    SpsaResult {
        point: theta,
        losses,
    }
}
