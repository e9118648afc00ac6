//! Feature selection and normalization pipeline
//!
//! Fit on the training matrix only, then applied identically to every test
//! matrix so feature columns stay aligned across datasets. Step order is
//! fixed:
//!
//! 1. drop highly-correlated columns (training correlation structure)
//! 2. drop zero-variance columns (fit on train)
//! 3. standardize to zero mean / unit variance (fit on train)
//! 4. duplicate the last column if the count is odd (the quantum feature map
//!    encodes adjacent feature pairs, so it needs an even count)

use crate::data::error::{PipelineError, PipelineResult};
use ndarray::{Array1, Array2, Axis};

/// Pairwise |Pearson r| above which the later column is dropped
pub const CORRELATION_THRESHOLD: f64 = 0.95;

/// Fitted state of the feature pipeline.
#[derive(Debug, Clone)]
struct FittedState {
    /// Raw column count the pipeline was fitted on
    n_raw: usize,
    /// Raw column indices kept after both drop steps, in order
    kept: Vec<usize>,
    /// Scaler parameters over the kept columns
    mean: Array1<f64>,
    std: Array1<f64>,
    /// Whether the last column is duplicated to force an even count
    pad_even: bool,
}

/// Feature selection + standardization pipeline.
#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    state: Option<FittedState>,
}

impl FeaturePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit all transforms on `train` and return the transformed matrix.
    pub fn fit_transform(&mut self, train: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        if train.nrows() == 0 || train.ncols() == 0 {
            return Err(PipelineError::EmptyInput(
                "training matrix is empty".to_string(),
            ));
        }

        let correlated = correlated_columns(train, CORRELATION_THRESHOLD);
        let kept: Vec<usize> = (0..train.ncols())
            .filter(|c| !correlated.contains(c))
            .collect();

        let reduced = train.select(Axis(1), &kept);

        // variance threshold: drop exactly-constant columns
        let variances = reduced.var_axis(Axis(0), 0.0);
        let kept: Vec<usize> = kept
            .iter()
            .zip(variances.iter())
            .filter(|(_, &v)| v > 0.0)
            .map(|(&c, _)| c)
            .collect();

        if kept.is_empty() {
            return Err(PipelineError::EmptyInput(
                "no features survive selection".to_string(),
            ));
        }

        let selected = train.select(Axis(1), &kept);
        let mean = selected
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::EmptyInput("no training rows".to_string()))?;
        let std = selected.std_axis(Axis(0), 0.0);

        let pad_even = kept.len() % 2 == 1;

        self.state = Some(FittedState {
            n_raw: train.ncols(),
            kept,
            mean,
            std,
            pad_even,
        });

        self.transform(train)
    }

    /// Apply the fitted transforms to a raw feature matrix.
    pub fn transform(&self, x: &Array2<f64>) -> PipelineResult<Array2<f64>> {
        let state = self.state.as_ref().ok_or(PipelineError::NotFitted)?;
        if x.ncols() != state.n_raw {
            return Err(PipelineError::ShapeMismatch {
                expected: state.n_raw,
                got: x.ncols(),
                context: "raw feature count differs from fit".to_string(),
            });
        }

        let selected = x.select(Axis(1), &state.kept);
        let mut scaled = Array2::zeros(selected.raw_dim());
        for (j, mut col) in scaled.axis_iter_mut(Axis(1)).enumerate() {
            let m = state.mean[j];
            let s = state.std[j];
            col.assign(&selected.column(j).mapv(|v| (v - m) / s));
        }

        if state.pad_even {
            Ok(duplicate_last_column(&scaled))
        } else {
            Ok(scaled)
        }
    }

    /// Apply the fitted column selection to feature names.
    pub fn select_names(&self, names: &[String]) -> PipelineResult<Vec<String>> {
        let state = self.state.as_ref().ok_or(PipelineError::NotFitted)?;
        let mut out: Vec<String> = state
            .kept
            .iter()
            .map(|&c| names.get(c).cloned().unwrap_or_else(|| format!("f{}", c)))
            .collect();
        if state.pad_even {
            let last = out.last().cloned().unwrap_or_default();
            out.push(format!("{}_dup", last));
        }
        Ok(out)
    }

    /// Output feature count after all transforms.
    pub fn n_output_features(&self) -> PipelineResult<usize> {
        let state = self.state.as_ref().ok_or(PipelineError::NotFitted)?;
        Ok(state.kept.len() + usize::from(state.pad_even))
    }
}

/// Column indices whose pairwise |Pearson r| with an earlier column exceeds
/// `threshold` (keep-first rule: the earlier column survives).
pub fn correlated_columns(x: &Array2<f64>, threshold: f64) -> Vec<usize> {
    let n_cols = x.ncols();
    let mean = match x.mean_axis(Axis(0)) {
        Some(m) => m,
        None => return Vec::new(),
    };
    let std = x.std_axis(Axis(0), 0.0);

    let mut dropped = Vec::new();
    for j in 1..n_cols {
        if dropped.contains(&j) {
            continue;
        }
        for i in 0..j {
            if dropped.contains(&i) {
                continue;
            }
            let r = pearson(
                &x.column(i).to_owned(),
                &x.column(j).to_owned(),
                mean[i],
                mean[j],
                std[i],
                std[j],
            );
            if r.abs() > threshold {
                dropped.push(j);
                break;
            }
        }
    }
    dropped
}

fn pearson(a: &Array1<f64>, b: &Array1<f64>, ma: f64, mb: f64, sa: f64, sb: f64) -> f64 {
    if sa < f64::EPSILON || sb < f64::EPSILON {
        return 0.0;
    }
    let n = a.len() as f64;
    let cov = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / n;
    cov / (sa * sb)
}

/// Append a copy of the last column, forcing an even column count.
pub fn duplicate_last_column(x: &Array2<f64>) -> Array2<f64> {
    let last = x.column(x.ncols() - 1).to_owned();
    let mut out = Array2::zeros((x.nrows(), x.ncols() + 1));
    out.slice_mut(ndarray::s![.., ..x.ncols()]).assign(x);
    out.column_mut(x.ncols()).assign(&last);
    out
}
