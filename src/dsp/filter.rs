//! IIR filter design and zero-phase application
//!
//! Filters are built as cascades of second-order sections (biquads) using the
//! RBJ audio-EQ cookbook formulas: a 4th-order Butterworth band-pass is a
//! high-pass pair at the low edge followed by a low-pass pair at the high
//! edge, and each powerline notch is a single section. Zero-phase response
//! comes from forward-backward (filtfilt) application; the 1 s edge crop in
//! the preprocessor absorbs the startup transients.

use ndarray::Array1;
use std::f64::consts::PI;
use thiserror::Error;

/// Filter design errors
#[derive(Error, Debug)]
pub enum DspError {
    #[error("invalid band: {0}")]
    InvalidBand(String),

    #[error("cutoff {cutoff} Hz out of range for sample rate {sample_rate} Hz")]
    CutoffOutOfRange { cutoff: f64, sample_rate: f64 },
}

/// Q values of the two sections of a 4th-order Butterworth cascade.
const BUTTERWORTH4_Q: [f64; 2] = [0.541_196_100_146_197, 1.306_562_964_876_377];

/// Quality factor for the powerline notches; 30 keeps the -3 dB rejection
/// band at 60 Hz to about 2 Hz.
pub const NOTCH_Q: f64 = 30.0;

/// A single second-order IIR section, normalized so a0 = 1.
#[derive(Debug, Clone, Copy)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Biquad {
    fn normalized(b0: f64, b1: f64, b2: f64, a0: f64, a1: f64, a2: f64) -> Self {
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// 2nd-order low-pass at `cutoff` Hz with quality factor `q`.
    pub fn lowpass(cutoff: f64, q: f64, sample_rate: f64) -> Result<Self, DspError> {
        let w0 = check_cutoff(cutoff, sample_rate)?;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        Ok(Self::normalized(
            (1.0 - cos_w0) / 2.0,
            1.0 - cos_w0,
            (1.0 - cos_w0) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        ))
    }

    /// 2nd-order high-pass at `cutoff` Hz with quality factor `q`.
    pub fn highpass(cutoff: f64, q: f64, sample_rate: f64) -> Result<Self, DspError> {
        let w0 = check_cutoff(cutoff, sample_rate)?;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        Ok(Self::normalized(
            (1.0 + cos_w0) / 2.0,
            -(1.0 + cos_w0),
            (1.0 + cos_w0) / 2.0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        ))
    }

    /// 2nd-order notch at `freq` Hz with quality factor `q`.
    pub fn notch(freq: f64, q: f64, sample_rate: f64) -> Result<Self, DspError> {
        let w0 = check_cutoff(freq, sample_rate)?;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        Ok(Self::normalized(
            1.0,
            -2.0 * cos_w0,
            1.0,
            1.0 + alpha,
            -2.0 * cos_w0,
            1.0 - alpha,
        ))
    }

    /// Run the section over `input` (direct form II transposed).
    fn process(&self, input: &[f64], output: &mut Vec<f64>) {
        output.clear();
        output.reserve(input.len());
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        for &x in input {
            let y = self.b0 * x + s1;
            s1 = self.b1 * x - self.a1 * y + s2;
            s2 = self.b2 * x - self.a2 * y;
            output.push(y);
        }
    }
}

fn check_cutoff(cutoff: f64, sample_rate: f64) -> Result<f64, DspError> {
    let nyquist = sample_rate / 2.0;
    if cutoff <= 0.0 || cutoff >= nyquist {
        return Err(DspError::CutoffOutOfRange {
            cutoff,
            sample_rate,
        });
    }
    Ok(2.0 * PI * cutoff / sample_rate)
}

/// A cascade of biquad sections applied in sequence.
#[derive(Debug, Clone)]
pub struct SosFilter {
    sections: Vec<Biquad>,
}

impl SosFilter {
    /// 4th-order Butterworth band-pass over `[low, high]` Hz.
    pub fn bandpass(low: f64, high: f64, sample_rate: f64) -> Result<Self, DspError> {
        if low >= high {
            return Err(DspError::InvalidBand(format!(
                "low edge {} Hz must be below high edge {} Hz",
                low, high
            )));
        }
        let mut sections = Vec::with_capacity(4);
        for q in BUTTERWORTH4_Q {
            sections.push(Biquad::highpass(low, q, sample_rate)?);
        }
        for q in BUTTERWORTH4_Q {
            sections.push(Biquad::lowpass(high, q, sample_rate)?);
        }
        Ok(Self { sections })
    }

    /// Notch cascade rejecting each frequency in `freqs`.
    pub fn notch_cascade(freqs: &[f64], sample_rate: f64) -> Result<Self, DspError> {
        let sections = freqs
            .iter()
            .map(|&f| Biquad::notch(f, NOTCH_Q, sample_rate))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sections })
    }

    /// Single forward pass through the cascade.
    pub fn filter(&self, input: &Array1<f64>) -> Array1<f64> {
        let mut current: Vec<f64> = input.to_vec();
        let mut scratch = Vec::new();
        for section in &self.sections {
            section.process(&current, &mut scratch);
            std::mem::swap(&mut current, &mut scratch);
        }
        Array1::from(current)
    }

    /// Zero-phase forward-backward application.
    ///
    /// The squared magnitude response doubles the attenuation and the phase
    /// cancels exactly; callers crop the edges afterwards to discard the
    /// startup transients.
    pub fn filtfilt(&self, input: &Array1<f64>) -> Array1<f64> {
        let forward = self.filter(input);
        let reversed = Array1::from_iter(forward.iter().rev().copied());
        let backward = self.filter(&reversed);
        Array1::from_iter(backward.iter().rev().copied())
    }
}
