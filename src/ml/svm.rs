//! Kernel support vector machine trained with simplified SMO
//!
//! Supports an RBF kernel over raw feature vectors and a precomputed kernel
//! for the quantum classifier, where the Gram matrix comes from the
//! statevector simulator. Labels are +1/-1.

use crate::data::error::{PipelineError, PipelineResult};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Kernel selection for the SVM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel {
    /// Gaussian kernel exp(-gamma * ||x - y||^2)
    Rbf { gamma: f64 },
    /// Caller supplies the Gram matrix
    Precomputed,
}

/// Kernel SVM classifier.
#[derive(Debug, Clone)]
pub struct SvmClassifier {
    pub kernel: Kernel,
    /// Box constraint
    pub c: f64,
    /// KKT violation tolerance
    pub tol: f64,
    /// Consecutive full passes without an update before stopping
    pub max_passes: usize,
    /// Hard cap on optimization passes
    pub max_iter: usize,
    seed: u64,

    // fitted state
    alphas: Option<Array1<f64>>,
    bias: f64,
    y_train: Option<Array1<f64>>,
    x_train: Option<Array2<f64>>,
}

impl SvmClassifier {
    /// SVM with the given kernel and box constraint; remaining knobs default.
    pub fn new(kernel: Kernel, c: f64) -> Self {
        Self {
            kernel,
            c,
            tol: 1e-3,
            max_passes: 5,
            max_iter: 1000,
            seed: 12345,
            alphas: None,
            bias: 0.0,
            y_train: None,
            x_train: None,
        }
    }

    /// Fit on raw feature vectors (RBF kernel only).
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<()> {
        let gamma = match self.kernel {
            Kernel::Rbf { gamma } => gamma,
            Kernel::Precomputed => {
                return Err(PipelineError::EmptyInput(
                    "precomputed kernel needs fit_precomputed".to_string(),
                ))
            }
        };
        let gram = rbf_gram(x, x, gamma);
        self.x_train = Some(x.clone());
        self.fit_precomputed(&gram, y)
    }

    /// Fit from a precomputed training Gram matrix (n x n).
    pub fn fit_precomputed(&mut self, gram: &Array2<f64>, y: &Array1<f64>) -> PipelineResult<()> {
        let n = y.len();
        if gram.nrows() != n || gram.ncols() != n {
            return Err(PipelineError::ShapeMismatch {
                expected: n,
                got: gram.nrows(),
                context: "gram matrix must be square over the training set".to_string(),
            });
        }
        if n == 0 {
            return Err(PipelineError::EmptyInput("empty training set".to_string()));
        }

        let (alphas, bias) = self.smo(gram, y);
        self.alphas = Some(alphas);
        self.bias = bias;
        self.y_train = Some(y.clone());
        Ok(())
    }

    /// Simplified SMO over the Gram matrix; returns (alphas, bias).
    fn smo(&self, k: &Array2<f64>, y: &Array1<f64>) -> (Array1<f64>, f64) {
        let n = y.len();
        let mut alphas = Array1::<f64>::zeros(n);
        let mut b = 0.0;
        if n < 2 {
            return (alphas, b);
        }
        let mut rng = StdRng::seed_from_u64(self.seed);

        let f = |alphas: &Array1<f64>, b: f64, i: usize| -> f64 {
            let mut sum = b;
            for j in 0..n {
                if alphas[j] != 0.0 {
                    sum += alphas[j] * y[j] * k[[j, i]];
                }
            }
            sum
        };

        let mut passes = 0;
        let mut iter = 0;
        while passes < self.max_passes && iter < self.max_iter {
            let mut num_changed = 0;
            for i in 0..n {
                let e_i = f(&alphas, b, i) - y[i];
                let violates = (y[i] * e_i < -self.tol && alphas[i] < self.c)
                    || (y[i] * e_i > self.tol && alphas[i] > 0.0);
                if !violates {
                    continue;
                }

                // pick a second index at random, distinct from i
                let mut j = rng.gen_range(0..n - 1);
                if j >= i {
                    j += 1;
                }
                let e_j = f(&alphas, b, j) - y[j];

                let alpha_i_old = alphas[i];
                let alpha_j_old = alphas[j];

                let (low, high) = if (y[i] - y[j]).abs() > f64::EPSILON {
                    (
                        (alphas[j] - alphas[i]).max(0.0),
                        (self.c + alphas[j] - alphas[i]).min(self.c),
                    )
                } else {
                    (
                        (alphas[i] + alphas[j] - self.c).max(0.0),
                        (alphas[i] + alphas[j]).min(self.c),
                    )
                };
                if (high - low).abs() < f64::EPSILON {
                    continue;
                }

                let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                let mut alpha_j_new = alpha_j_old - y[j] * (e_i - e_j) / eta;
                alpha_j_new = alpha_j_new.clamp(low, high);
                if (alpha_j_new - alpha_j_old).abs() < 1e-5 {
                    continue;
                }

                let alpha_i_new = alpha_i_old + y[i] * y[j] * (alpha_j_old - alpha_j_new);
                alphas[i] = alpha_i_new;
                alphas[j] = alpha_j_new;

                let b1 = b
                    - e_i
                    - y[i] * (alpha_i_new - alpha_i_old) * k[[i, i]]
                    - y[j] * (alpha_j_new - alpha_j_old) * k[[i, j]];
                let b2 = b
                    - e_j
                    - y[i] * (alpha_i_new - alpha_i_old) * k[[i, j]]
                    - y[j] * (alpha_j_new - alpha_j_old) * k[[j, j]];
                b = if alpha_i_new > 0.0 && alpha_i_new < self.c {
                    b1
                } else if alpha_j_new > 0.0 && alpha_j_new < self.c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                num_changed += 1;
            }

            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
            iter += 1;
        }

        (alphas, b)
    }

    /// Decision values for raw feature vectors (RBF kernel).
    pub fn decision_function(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        let gamma = match self.kernel {
            Kernel::Rbf { gamma } => gamma,
            Kernel::Precomputed => {
                return Err(PipelineError::EmptyInput(
                    "precomputed kernel needs decision_function_precomputed".to_string(),
                ))
            }
        };
        let x_train = self.x_train.as_ref().ok_or(PipelineError::NotFitted)?;
        let k_test = rbf_gram(x, x_train, gamma);
        self.decision_function_precomputed(&k_test)
    }

    /// Decision values from a (n_test x n_train) kernel matrix.
    pub fn decision_function_precomputed(
        &self,
        k_test: &Array2<f64>,
    ) -> PipelineResult<Array1<f64>> {
        let alphas = self.alphas.as_ref().ok_or(PipelineError::NotFitted)?;
        let y = self.y_train.as_ref().ok_or(PipelineError::NotFitted)?;
        if k_test.ncols() != alphas.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: alphas.len(),
                got: k_test.ncols(),
                context: "test kernel columns must match training set size".to_string(),
            });
        }

        let dual = alphas * y;
        Ok(k_test
            .axis_iter(Axis(0))
            .map(|row| row.dot(&dual) + self.bias)
            .collect())
    }

    /// Predict +1/-1 labels for raw feature vectors.
    pub fn predict(&self, x: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        Ok(self.decision_function(x)?.mapv(sign))
    }

    /// Predict +1/-1 labels from a precomputed test kernel matrix.
    pub fn predict_precomputed(&self, k_test: &Array2<f64>) -> PipelineResult<Array1<f64>> {
        Ok(self.decision_function_precomputed(k_test)?.mapv(sign))
    }

    /// Signed dual coefficients alpha_i * y_i of the fitted model.
    pub fn dual_coefficients(&self) -> PipelineResult<Array1<f64>> {
        let alphas = self.alphas.as_ref().ok_or(PipelineError::NotFitted)?;
        let y = self.y_train.as_ref().ok_or(PipelineError::NotFitted)?;
        Ok(alphas * y)
    }
}

fn sign(v: f64) -> f64 {
    if v >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// RBF Gram matrix between the rows of `a` (n_a) and `b` (n_b): n_a x n_b.
pub fn rbf_gram(a: &Array2<f64>, b: &Array2<f64>, gamma: f64) -> Array2<f64> {
    let mut k = Array2::zeros((a.nrows(), b.nrows()));
    for (i, ai) in a.axis_iter(Axis(0)).enumerate() {
        for (j, bj) in b.axis_iter(Axis(0)).enumerate() {
            let d2 = ai
                .iter()
                .zip(bj.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>();
            k[[i, j]] = (-gamma * d2).exp();
        }
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Two well-separated Gaussian blobs, labels +1/-1.
    fn blobs(n_per_class: usize, seed: u64) -> (Array2<f64>, Array1<f64>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut x = Array2::zeros((2 * n_per_class, 2));
        let mut y = Array1::zeros(2 * n_per_class);
        for i in 0..n_per_class {
            x[[i, 0]] = 2.0 + rng.gen_range(-0.5..0.5);
            x[[i, 1]] = 2.0 + rng.gen_range(-0.5..0.5);
            y[i] = 1.0;
            x[[n_per_class + i, 0]] = -2.0 + rng.gen_range(-0.5..0.5);
            x[[n_per_class + i, 1]] = -2.0 + rng.gen_range(-0.5..0.5);
            y[n_per_class + i] = -1.0;
        }
        (x, y)
    }

    #[test]
    fn test_rbf_svm_separates_blobs() {
        let (x, y) = blobs(20, 42);
        let mut svm = SvmClassifier::new(Kernel::Rbf { gamma: 1.0 }, 2.0);
        svm.fit(&x, &y).unwrap();

        let predictions = svm.predict(&x).unwrap();
        let correct = predictions
            .iter()
            .zip(y.iter())
            .filter(|(p, t)| (*p - *t).abs() < 1e-9)
            .count();
        assert_eq!(correct, y.len());
    }

    #[test]
    fn test_precomputed_matches_rbf() {
        let (x, y) = blobs(15, 7);
        let gamma = 1.0;

        let mut rbf_svm = SvmClassifier::new(Kernel::Rbf { gamma }, 2.0);
        rbf_svm.fit(&x, &y).unwrap();

        let gram = rbf_gram(&x, &x, gamma);
        let mut pre_svm = SvmClassifier::new(Kernel::Precomputed, 2.0);
        pre_svm.fit_precomputed(&gram, &y).unwrap();

        let from_rbf = rbf_svm.predict(&x).unwrap();
        let from_pre = pre_svm.predict_precomputed(&gram).unwrap();
        assert_eq!(from_rbf, from_pre);
    }

    #[test]
    fn test_gram_diagonal_is_one() {
        let x = array![[1.0, 2.0], [3.0, -1.0], [0.0, 0.5]];
        let k = rbf_gram(&x, &x, 0.7);
        for i in 0..3 {
            assert!((k[[i, i]] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_unfitted_predict_fails() {
        let svm = SvmClassifier::new(Kernel::Rbf { gamma: 1.0 }, 2.0);
        let x = array![[0.0, 0.0]];
        assert!(svm.predict(&x).is_err());
    }

    #[test]
    fn test_bad_kernel_shape_rejected() {
        let (x, y) = blobs(5, 3);
        let gram = rbf_gram(&x, &x, 1.0);
        let mut svm = SvmClassifier::new(Kernel::Precomputed, 2.0);
        svm.fit_precomputed(&gram, &y).unwrap();

        let bad = Array2::zeros((4, 3));
        assert!(matches!(
            svm.predict_precomputed(&bad),
            Err(PipelineError::ShapeMismatch { .. })
        ));
    }
}
