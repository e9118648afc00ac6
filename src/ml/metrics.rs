//! Evaluation metrics for binary classifiers
//!
//! The experiment's test windows are mostly noise, so raw accuracy rewards a
//! classifier that always answers "noise". Balanced accuracy (mean per-class
//! recall) is the headline score.

use ndarray::Array1;

/// Metrics calculator
pub struct Metrics;

impl Metrics {
    /// Balanced accuracy: mean of the per-class recalls over the classes
    /// present in `y_true`.
    pub fn balanced_accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }

        let mut classes: Vec<f64> = y_true.iter().cloned().collect();
        classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        classes.dedup();

        let recalls: Vec<f64> = classes
            .iter()
            .map(|&class| Self::recall(y_true, y_pred, class))
            .collect();
        recalls.iter().sum::<f64>() / recalls.len() as f64
    }

    /// Plain accuracy: fraction of matching labels.
    pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        assert_eq!(y_true.len(), y_pred.len(), "arrays must have same length");
        if y_true.is_empty() {
            return 0.0;
        }
        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (*t - *p).abs() < 1e-10)
            .count();
        correct as f64 / y_true.len() as f64
    }

    /// Recall for one class: TP / (TP + FN).
    pub fn recall(y_true: &Array1<f64>, y_pred: &Array1<f64>, class: f64) -> f64 {
        let (tp, _, fn_, _) = Self::confusion_values(y_true, y_pred, class);
        if tp + fn_ == 0 {
            0.0
        } else {
            tp as f64 / (tp + fn_) as f64
        }
    }

    /// Confusion counts (TP, FP, FN, TN) for a given positive class.
    fn confusion_values(
        y_true: &Array1<f64>,
        y_pred: &Array1<f64>,
        positive_class: f64,
    ) -> (usize, usize, usize, usize) {
        let mut tp = 0;
        let mut fp = 0;
        let mut fn_ = 0;
        let mut tn = 0;

        for (t, p) in y_true.iter().zip(y_pred.iter()) {
            let actual_positive = (*t - positive_class).abs() < 1e-10;
            let predicted_positive = (*p - positive_class).abs() < 1e-10;
            match (actual_positive, predicted_positive) {
                (true, true) => tp += 1,
                (false, true) => fp += 1,
                (true, false) => fn_ += 1,
                (false, false) => tn += 1,
            }
        }
        (tp, fp, fn_, tn)
    }
}
