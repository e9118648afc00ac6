//! Statevector quantum simulator
//!
//! Minimal n-qubit state vector over `Complex64` with the gate set the
//! covariant feature map needs: Rx/Ry/Rz rotations, Hadamard, and the CZ
//! entangler. Qubit 0 is the least significant bit of the basis index.

use num_complex::Complex64;

/// An n-qubit pure state.
#[derive(Debug, Clone)]
pub struct StateVector {
    n_qubits: usize,
    amps: Vec<Complex64>,
}

impl StateVector {
    /// The all-zeros state |0...0>.
    pub fn zero(n_qubits: usize) -> Self {
        let mut amps = vec![Complex64::new(0.0, 0.0); 1 << n_qubits];
        amps[0] = Complex64::new(1.0, 0.0);
        Self { n_qubits, amps }
    }

    pub fn n_qubits(&self) -> usize {
        self.n_qubits
    }

    /// Amplitudes in computational-basis order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amps
    }

    /// Basis-state probabilities.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Apply a general single-qubit unitary [[u00, u01], [u10, u11]].
    fn apply_single(&mut self, qubit: usize, u: [[Complex64; 2]; 2]) {
        debug_assert!(qubit < self.n_qubits);
        let bit = 1usize << qubit;
        for idx in 0..self.amps.len() {
            if idx & bit == 0 {
                let a0 = self.amps[idx];
                let a1 = self.amps[idx | bit];
                self.amps[idx] = u[0][0] * a0 + u[0][1] * a1;
                self.amps[idx | bit] = u[1][0] * a0 + u[1][1] * a1;
            }
        }
    }

    /// Rx(theta) rotation about the X axis.
    pub fn rx(&mut self, qubit: usize, theta: f64) {
        let (sin, cos) = (theta / 2.0).sin_cos();
        let mi_sin = Complex64::new(0.0, -sin);
        let c = Complex64::new(cos, 0.0);
        self.apply_single(qubit, [[c, mi_sin], [mi_sin, c]]);
    }

    /// Ry(theta) rotation about the Y axis.
    pub fn ry(&mut self, qubit: usize, theta: f64) {
        let (sin, cos) = (theta / 2.0).sin_cos();
        let c = Complex64::new(cos, 0.0);
        let s = Complex64::new(sin, 0.0);
        self.apply_single(qubit, [[c, -s], [s, c]]);
    }

    /// Rz(theta) rotation about the Z axis.
    pub fn rz(&mut self, qubit: usize, theta: f64) {
        let phase_neg = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_pos = Complex64::from_polar(1.0, theta / 2.0);
        let zero = Complex64::new(0.0, 0.0);
        self.apply_single(qubit, [[phase_neg, zero], [zero, phase_pos]]);
    }

    /// Hadamard gate.
    pub fn h(&mut self, qubit: usize) {
        let inv_sqrt2 = Complex64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0);
        self.apply_single(
            qubit,
            [[inv_sqrt2, inv_sqrt2], [inv_sqrt2, -inv_sqrt2]],
        );
    }

    /// Controlled-Z: flips the sign of amplitudes where both qubits are 1.
    pub fn cz(&mut self, a: usize, b: usize) {
        debug_assert!(a != b && a < self.n_qubits && b < self.n_qubits);
        let mask = (1usize << a) | (1usize << b);
        for (idx, amp) in self.amps.iter_mut().enumerate() {
            if idx & mask == mask {
                *amp = -*amp;
            }
        }
    }

    /// Inner product <self|other>.
    pub fn inner(&self, other: &StateVector) -> Complex64 {
        debug_assert_eq!(self.n_qubits, other.n_qubits);
        self.amps
            .iter()
            .zip(other.amps.iter())
            .map(|(a, b)| a.conj() * b)
            .sum()
    }

    /// State fidelity |<self|other>|^2.
    pub fn fidelity(&self, other: &StateVector) -> f64 {
        self.inner(other).norm_sqr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_state_normalized() {
        let s = StateVector::zero(3);
        let probs = s.probabilities();
        assert_abs_diff_eq!(probs[0], 1.0);
        assert_abs_diff_eq!(probs.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_h_creates_uniform_superposition() {
        let mut s = StateVector::zero(1);
        s.h(0);
        let probs = s.probabilities();
        assert_abs_diff_eq!(probs[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rx_pi_is_bit_flip() {
        let mut s = StateVector::zero(1);
        s.rx(0, PI);
        let probs = s.probabilities();
        assert_abs_diff_eq!(probs[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ry_rotation_angle() {
        let mut s = StateVector::zero(1);
        s.ry(0, PI / 2.0);
        let probs = s.probabilities();
        assert_abs_diff_eq!(probs[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(probs[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rz_leaves_probabilities() {
        let mut s = StateVector::zero(1);
        s.h(0);
        let before = s.probabilities();
        s.rz(0, 1.234);
        let after = s.probabilities();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cz_phase_on_11() {
        let mut s = StateVector::zero(2);
        s.h(0);
        s.h(1);
        s.cz(0, 1);
        let amps = s.amplitudes();
        // |00>, |01>, |10> keep +1/2, |11> flips to -1/2
        assert_abs_diff_eq!(amps[0].re, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(amps[3].re, -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_fidelity_self_is_one() {
        let mut s = StateVector::zero(2);
        s.ry(0, 0.7);
        s.rz(1, -0.3);
        s.cz(0, 1);
        assert_abs_diff_eq!(s.fidelity(&s), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fidelity_orthogonal_is_zero() {
        let s0 = StateVector::zero(1);
        let mut s1 = StateVector::zero(1);
        s1.rx(0, PI);
        assert_abs_diff_eq!(s0.fidelity(&s1), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unitarity_preserves_norm() {
        let mut s = StateVector::zero(4);
        for q in 0..4 {
            s.ry(q, 0.3 * (q as f64 + 1.0));
            s.rx(q, -0.8);
            s.rz(q, 2.1);
        }
        s.cz(0, 1);
        s.cz(2, 3);
        assert_abs_diff_eq!(s.probabilities().iter().sum::<f64>(), 1.0, epsilon = 1e-10);
    }
}
