//! Windowing and labeling of strain series
//!
//! Slices a continuous series into fixed-length overlapping windows
//! (length = fs/4 samples, hop = fs/8, 50% overlap), applies a Tukey taper
//! to each, and labels each window by whether the event GPS time falls within
//! its inclusive time span.

use super::error::{PipelineError, PipelineResult};
use super::types::{StrainSeries, Window};
use crate::dsp::tukey;
use ndarray::Array1;

/// How the windower treats the end of the series.
///
/// The original analysis ran a fixed iteration count derived from an assumed
/// duration, which can walk past the end of a shorter series. `FixedCount`
/// keeps that iteration count but fails loudly instead of reading out of
/// range; `ToEnd` stops at the last full window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// Produce exactly `n` windows; error if the series is too short
    FixedCount(usize),
    /// Produce as many full windows as fit
    ToEnd,
}

/// Windower producing tapered, labeled segments.
#[derive(Debug, Clone)]
pub struct Windower {
    /// Window length in samples
    pub window_len: usize,
    /// Hop between successive window starts, in samples
    pub hop: usize,
    taper: Array1<f64>,
}

impl Windower {
    /// Standard windower for a given sample rate: length fs/4, hop fs/8.
    pub fn for_sample_rate(sample_rate: f64) -> Self {
        let window_len = (sample_rate / 4.0).round() as usize;
        let hop = (sample_rate / 8.0).round() as usize;
        Self::new(window_len, hop)
    }

    /// Windower with explicit geometry.
    pub fn new(window_len: usize, hop: usize) -> Self {
        Self {
            window_len,
            hop,
            taper: tukey(window_len, 0.5),
        }
    }

    /// Slice `series` into tapered windows.
    pub fn windows(
        &self,
        series: &StrainSeries,
        policy: BoundsPolicy,
    ) -> PipelineResult<Vec<Window>> {
        if self.window_len == 0 || self.hop == 0 {
            return Err(PipelineError::EmptyInput(
                "window length and hop must be positive".to_string(),
            ));
        }

        let count = match policy {
            BoundsPolicy::FixedCount(n) => {
                let needed = (n.saturating_sub(1)) * self.hop + self.window_len;
                if n > 0 && needed > series.len() {
                    return Err(PipelineError::ShapeMismatch {
                        expected: needed,
                        got: series.len(),
                        context: format!("series too short for {} fixed windows", n),
                    });
                }
                n
            }
            BoundsPolicy::ToEnd => {
                if series.len() < self.window_len {
                    0
                } else {
                    (series.len() - self.window_len) / self.hop + 1
                }
            }
        };

        let mut out = Vec::with_capacity(count);
        for k in 0..count {
            let start = k * self.hop;
            let end = start + self.window_len;
            let samples = &series.samples.slice(ndarray::s![start..end]) * &self.taper;
            out.push(Window {
                samples,
                start_time: series.time_at(start),
                end_time: series.time_at(end - 1),
            });
        }
        Ok(out)
    }

    /// Slice and label against a reference event time.
    ///
    /// A window is labeled +1 iff `gps` lies in the inclusive span
    /// `[start_time, end_time]`, -1 otherwise.
    pub fn labeled_windows(
        &self,
        series: &StrainSeries,
        gps: f64,
        policy: BoundsPolicy,
    ) -> PipelineResult<Vec<(Window, i8)>> {
        let windows = self.windows(series, policy)?;
        Ok(windows
            .into_iter()
            .map(|w| {
                let label = label_window(w.start_time, w.end_time, gps);
                (w, label)
            })
            .collect())
    }
}

/// Label rule: +1 iff the event time lies in the inclusive window span.
pub fn label_window(start_time: f64, end_time: f64, gps: f64) -> i8 {
    if gps >= start_time && gps <= end_time {
        1
    } else {
        -1
    }
}
