//! Temporal statistical features per window
//!
//! Extracts a fixed-order vector of temporal-domain statistics from each
//! tapered window. The set and ordering are fixed so that train and test
//! matrices stay column-aligned; several features use the sample rate (area,
//! centroid, slope), which is why the extractor carries it.

use crate::data::error::{PipelineError, PipelineResult};
use crate::data::types::Window;
use ndarray::{Array1, Array2};

/// Number of histogram bins used by the entropy feature
const ENTROPY_BINS: usize = 10;

/// Fixed-order temporal feature extractor.
#[derive(Debug, Clone)]
pub struct TemporalExtractor {
    /// Sample rate of the windows being featurized, in Hz
    pub sample_rate: f64,
}

impl TemporalExtractor {
    pub fn new(sample_rate: f64) -> Self {
        Self { sample_rate }
    }

    /// Names of the extracted features, in column order.
    pub fn feature_names() -> Vec<String> {
        [
            "abs_energy",
            "area_under_curve",
            "autocorrelation_lag1",
            "centroid",
            "entropy",
            "mean",
            "mean_abs_deviation",
            "mean_abs_diff",
            "mean_diff",
            "median",
            "median_abs_deviation",
            "median_abs_diff",
            "median_diff",
            "negative_turning_points",
            "peak_to_peak",
            "positive_turning_points",
            "signal_distance",
            "slope",
            "sum_abs_diff",
            "zero_crossing_rate",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Number of features per window.
    pub fn n_features() -> usize {
        Self::feature_names().len()
    }

    /// Extract the feature vector of a single window.
    pub fn extract(&self, samples: &Array1<f64>) -> PipelineResult<Array1<f64>> {
        let x = samples.as_slice().ok_or_else(|| {
            PipelineError::EmptyInput("window samples must be contiguous".to_string())
        })?;
        if x.len() < 2 {
            return Err(PipelineError::EmptyInput(
                "window must hold at least two samples".to_string(),
            ));
        }

        let n = x.len();
        let dt = 1.0 / self.sample_rate;
        let diffs: Vec<f64> = x.windows(2).map(|p| p[1] - p[0]).collect();

        let mean = x.iter().sum::<f64>() / n as f64;
        let med = median(x);
        let abs_energy: f64 = x.iter().map(|v| v * v).sum();

        let features = vec![
            abs_energy,
            trapezoid_area(x, dt),
            autocorrelation_lag1(x, mean),
            energy_centroid(x, dt, abs_energy),
            histogram_entropy(x),
            mean,
            x.iter().map(|v| (v - mean).abs()).sum::<f64>() / n as f64,
            diffs.iter().map(|d| d.abs()).sum::<f64>() / diffs.len() as f64,
            diffs.iter().sum::<f64>() / diffs.len() as f64,
            med,
            median(&x.iter().map(|v| (v - med).abs()).collect::<Vec<_>>()),
            median(&diffs.iter().map(|d| d.abs()).collect::<Vec<_>>()),
            median(&diffs),
            turning_points(x, false) as f64,
            x.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
                - x.iter().cloned().fold(f64::INFINITY, f64::min),
            turning_points(x, true) as f64,
            diffs.iter().map(|d| (1.0 + d * d).sqrt()).sum::<f64>(),
            least_squares_slope(x, dt),
            diffs.iter().map(|d| d.abs()).sum::<f64>(),
            zero_crossing_rate(x),
        ];
        Ok(Array1::from(features))
    }

    /// Extract a feature matrix, one row per window.
    pub fn extract_matrix(&self, windows: &[Window]) -> PipelineResult<Array2<f64>> {
        if windows.is_empty() {
            return Err(PipelineError::EmptyInput("no windows to featurize".to_string()));
        }
        let n_features = Self::n_features();
        let mut matrix = Array2::zeros((windows.len(), n_features));
        for (i, w) in windows.iter().enumerate() {
            let row = self.extract(&w.samples)?;
            matrix.row_mut(i).assign(&row);
        }
        Ok(matrix)
    }
}

fn median(x: &[f64]) -> f64 {
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

fn trapezoid_area(x: &[f64], dt: f64) -> f64 {
    x.windows(2).map(|p| (p[0] + p[1]) / 2.0 * dt).sum()
}

/// Normalized lag-1 autocorrelation; 0 for a (near-)constant window.
fn autocorrelation_lag1(x: &[f64], mean: f64) -> f64 {
    let denom: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    if denom < f64::EPSILON {
        return 0.0;
    }
    let num: f64 = x
        .windows(2)
        .map(|p| (p[0] - mean) * (p[1] - mean))
        .sum();
    num / denom
}

/// Energy-weighted temporal centroid, in seconds from the window start.
fn energy_centroid(x: &[f64], dt: f64, abs_energy: f64) -> f64 {
    if abs_energy < f64::EPSILON {
        return 0.0;
    }
    x.iter()
        .enumerate()
        .map(|(i, v)| i as f64 * dt * v * v)
        .sum::<f64>()
        / abs_energy
}

/// Shannon entropy (nats) of a fixed-bin amplitude histogram.
fn histogram_entropy(x: &[f64]) -> f64 {
    let min = x.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return 0.0;
    }
    let mut counts = [0usize; ENTROPY_BINS];
    let scale = ENTROPY_BINS as f64 / (max - min);
    for &v in x {
        let bin = (((v - min) * scale) as usize).min(ENTROPY_BINS - 1);
        counts[bin] += 1;
    }
    let n = x.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.ln()
        })
        .sum()
}

/// Count local maxima (`positive = true`) or minima in the interior.
fn turning_points(x: &[f64], positive: bool) -> usize {
    x.windows(3)
        .filter(|w| {
            if positive {
                w[1] > w[0] && w[1] > w[2]
            } else {
                w[1] < w[0] && w[1] < w[2]
            }
        })
        .count()
}

/// Least-squares slope of the window against its time axis.
fn least_squares_slope(x: &[f64], dt: f64) -> f64 {
    let n = x.len() as f64;
    let t_mean = dt * (x.len() - 1) as f64 / 2.0;
    let x_mean = x.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut denom = 0.0;
    for (i, &v) in x.iter().enumerate() {
        let t = i as f64 * dt - t_mean;
        num += t * (v - x_mean);
        denom += t * t;
    }
    if denom < f64::EPSILON {
        0.0
    } else {
        num / denom
    }
}

/// Fraction of successive sample pairs with an (strict) sign change.
fn zero_crossing_rate(x: &[f64]) -> f64 {
    let crossings = x
        .windows(2)
        .filter(|p| p[0].signum() != p[1].signum() && p[0] != 0.0 && p[1] != 0.0)
        .count();
    crossings as f64 / (x.len() - 1) as f64
}
