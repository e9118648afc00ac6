//! Taper windows

use ndarray::Array1;
use std::f64::consts::PI;

/// Tukey (tapered cosine) window of length `n`.
///
/// `alpha` is the fraction of the window inside the cosine tapers; 0 gives a
/// rectangular window, 1 a Hann window. The flat middle region is exactly 1.
pub fn tukey(n: usize, alpha: f64) -> Array1<f64> {
    if n == 0 {
        return Array1::zeros(0);
    }
    if n == 1 {
        return Array1::ones(1);
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha == 0.0 {
        return Array1::ones(n);
    }

    let m = n - 1;
    let edge = alpha * m as f64 / 2.0;
    Array1::from_shape_fn(n, |i| {
        let i_f = i as f64;
        // mirror the right taper onto the left-taper formula
        let x = if i_f <= edge {
            i_f
        } else if i_f >= m as f64 - edge {
            m as f64 - i_f
        } else {
            return 1.0;
        };
        0.5 * (1.0 + (PI * (2.0 * x / (alpha * m as f64) - 1.0)).cos())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_tukey_edges_and_flat_region() {
        let w = tukey(101, 0.5);
        assert_abs_diff_eq!(w[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[100], 0.0, epsilon = 1e-12);
        // flat middle
        assert_abs_diff_eq!(w[50], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[40], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(w[60], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tukey_symmetric() {
        let w = tukey(64, 0.5);
        for i in 0..32 {
            assert_abs_diff_eq!(w[i], w[63 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tukey_alpha_zero_is_rectangular() {
        let w = tukey(16, 0.0);
        assert!(w.iter().all(|&v| (v - 1.0).abs() < 1e-12));
    }
}
