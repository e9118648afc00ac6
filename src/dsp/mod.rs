//! Digital signal processing: filters, tapers, preprocessing

pub mod filter;
pub mod window;

pub use filter::{Biquad, DspError, SosFilter};
pub use window::tukey;

use crate::data::StrainSeries;

/// Band edges of the analysis band-pass, in Hz.
pub const BAND: (f64, f64) = (50.0, 250.0);

/// US powerline frequency and harmonics removed by the notch cascade, in Hz.
pub const POWERLINE_HARMONICS: [f64; 3] = [60.0, 120.0, 180.0];

/// Seconds cropped from each edge to discard filter transients.
pub const EDGE_CROP_SECONDS: f64 = 1.0;

/// Standard preprocessing applied to raw detector strain:
///
/// 1. zero-phase band-pass over [50, 250] Hz
/// 2. crop 1 second from each edge
/// 3. zero-phase notch cascade at 60/120/180 Hz
///
/// The sample rate is preserved throughout.
pub fn preprocess(raw: &StrainSeries) -> Result<StrainSeries, DspError> {
    let fs = raw.sample_rate;

    let bandpass = SosFilter::bandpass(BAND.0, BAND.1, fs)?;
    let bandpassed = StrainSeries::new(bandpass.filtfilt(&raw.samples), fs, raw.t0);

    let cropped = bandpassed.crop_edges(EDGE_CROP_SECONDS);

    let notch = SosFilter::notch_cascade(&POWERLINE_HARMONICS, fs)?;
    Ok(StrainSeries::new(
        notch.filtfilt(&cropped.samples),
        fs,
        cropped.t0,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;
    use std::f64::consts::PI;

    #[test]
    fn test_preprocess_preserves_sample_rate_and_crops() {
        let fs = 2048.0;
        let n = (fs * 12.0) as usize;
        let raw = StrainSeries::new(
            Array1::from_shape_fn(n, |i| (2.0 * PI * 100.0 * i as f64 / fs).sin()),
            fs,
            1000.0,
        );

        let clean = preprocess(&raw).unwrap();
        assert_eq!(clean.sample_rate, fs);
        assert_eq!(clean.len(), (fs * 10.0) as usize);
        assert!((clean.t0 - 1001.0).abs() < 1e-9);
    }

    #[test]
    fn test_preprocess_removes_powerline() {
        let fs = 2048.0;
        let n = (fs * 12.0) as usize;
        // in-band astrophysical tone plus a strong 60 Hz line
        let raw = StrainSeries::new(
            Array1::from_shape_fn(n, |i| {
                let t = i as f64 / fs;
                (2.0 * PI * 150.0 * t).sin() + 5.0 * (2.0 * PI * 60.0 * t).sin()
            }),
            fs,
            0.0,
        );

        let clean = preprocess(&raw).unwrap();
        // correlate against both tones over the middle of the segment
        let mid = clean.samples.slice(ndarray::s![clean.len() / 4..3 * clean.len() / 4]);
        let t0_offset = clean.len() / 4;
        let mut p150 = 0.0;
        let mut p60 = 0.0;
        for (i, &v) in mid.iter().enumerate() {
            let t = (i + t0_offset) as f64 / fs + 1.0;
            p150 += v * (2.0 * PI * 150.0 * t).sin();
            p60 += v * (2.0 * PI * 60.0 * t).sin();
        }
        assert!(p150.abs() > 20.0 * p60.abs());
    }
}
