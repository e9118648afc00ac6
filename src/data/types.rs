//! Core data types for strain data and ML datasets
//!
//! This module defines the fundamental data structures used throughout the
//! library:
//! - StrainSeries: uniformly sampled detector strain
//! - Window: a tapered, labeled slice of a strain series
//! - Dataset: feature matrix and labels for classification

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// A uniformly sampled real-valued strain time series.
///
/// Immutable once constructed: preprocessing steps (filtering, cropping)
/// return new series rather than mutating in place. The time of sample `i`
/// is `t0 + i / sample_rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrainSeries {
    /// Strain samples
    pub samples: Array1<f64>,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// GPS time of the first sample, in seconds
    pub t0: f64,
}

impl StrainSeries {
    /// Create a new series from samples, sample rate and start time
    pub fn new(samples: Array1<f64>, sample_rate: f64, t0: f64) -> Self {
        Self {
            samples,
            sample_rate,
            t0,
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the series holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate
    }

    /// GPS time of sample `index`
    pub fn time_at(&self, index: usize) -> f64 {
        self.t0 + index as f64 / self.sample_rate
    }

    /// Return a new series holding the samples in `[start, end)` (sample
    /// indices), with `t0` shifted accordingly.
    pub fn slice(&self, start: usize, end: usize) -> StrainSeries {
        let end = end.min(self.len());
        let start = start.min(end);
        StrainSeries {
            samples: self.samples.slice(ndarray::s![start..end]).to_owned(),
            sample_rate: self.sample_rate,
            t0: self.time_at(start),
        }
    }

    /// Crop `seconds` from each edge of the series.
    ///
    /// Used to discard filter transients after zero-phase filtering.
    pub fn crop_edges(&self, seconds: f64) -> StrainSeries {
        let n = (seconds * self.sample_rate).round() as usize;
        let end = self.len().saturating_sub(n);
        self.slice(n, end)
    }
}

/// A fixed-length, tapered slice of a strain series.
#[derive(Debug, Clone)]
pub struct Window {
    /// Tapered samples
    pub samples: Array1<f64>,
    /// GPS time of the first sample
    pub start_time: f64,
    /// GPS time of the last sample
    pub end_time: f64,
}

/// An ordered collection of feature vectors and labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature matrix, one row per window
    pub x: Array2<f64>,
    /// Labels (+1 / -1) as f64, one per row
    pub y: Array1<f64>,
    /// Column names, aligned with `x`
    pub feature_names: Vec<String>,
}

impl Dataset {
    /// Create a dataset, checking that rows and labels line up
    pub fn new(x: Array2<f64>, y: Array1<f64>, feature_names: Vec<String>) -> Self {
        assert_eq!(x.nrows(), y.len(), "feature rows and labels must align");
        Self {
            x,
            y,
            feature_names,
        }
    }

    /// Number of samples (rows)
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    /// Number of features (columns)
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array1;

    fn series(n: usize, fs: f64, t0: f64) -> StrainSeries {
        StrainSeries::new(Array1::linspace(0.0, 1.0, n), fs, t0)
    }

    #[test]
    fn test_time_at() {
        let s = series(4096, 4096.0, 1000.0);
        assert_abs_diff_eq!(s.time_at(0), 1000.0);
        assert_abs_diff_eq!(s.time_at(4096), 1001.0);
        assert_abs_diff_eq!(s.duration(), 1.0);
    }

    #[test]
    fn test_crop_edges() {
        let s = series(4096 * 12, 4096.0, 0.0);
        let cropped = s.crop_edges(1.0);
        assert_eq!(cropped.len(), 4096 * 10);
        assert_abs_diff_eq!(cropped.t0, 1.0);
        assert_abs_diff_eq!(cropped.duration(), 10.0);
    }

    #[test]
    fn test_slice_shifts_t0() {
        let s = series(100, 10.0, 5.0);
        let sl = s.slice(10, 30);
        assert_eq!(sl.len(), 20);
        assert_abs_diff_eq!(sl.t0, 6.0);
    }
}
