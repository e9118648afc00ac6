//! Loading and saving strain series as text files
//!
//! Series are stored as whitespace-delimited `time value` pairs, one sample
//! per line, the format the simulated-signal and background-noise files use.
//! Lines starting with `#` are ignored.

use super::error::{DataError, DataResult};
use super::types::StrainSeries;
use ndarray::Array1;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Loader for text-serialized strain series
pub struct SeriesLoader;

impl SeriesLoader {
    /// Read a strain series from a whitespace-delimited text file.
    ///
    /// The sample rate is inferred from the spacing of the first two time
    /// stamps; the start time is the first time stamp.
    pub fn load<P: AsRef<Path>>(path: P) -> DataResult<StrainSeries> {
        let path_str = path.as_ref().display().to_string();
        let file = File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DataError::NotFound(path_str.clone())
            } else {
                DataError::Io(e)
            }
        })?;

        let reader = BufReader::new(file);
        let mut times = Vec::new();
        let mut values = Vec::new();

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let mut parts = trimmed.split_whitespace();
            let (t, v) = match (parts.next(), parts.next()) {
                (Some(t), Some(v)) => (t, v),
                _ => {
                    return Err(DataError::Format {
                        path: path_str,
                        reason: format!("line {}: expected two columns", lineno + 1),
                    })
                }
            };
            let t: f64 = t.parse().map_err(|_| DataError::Format {
                path: path_str.clone(),
                reason: format!("line {}: bad time stamp '{}'", lineno + 1, t),
            })?;
            let v: f64 = v.parse().map_err(|_| DataError::Format {
                path: path_str.clone(),
                reason: format!("line {}: bad value '{}'", lineno + 1, v),
            })?;
            times.push(t);
            values.push(v);
        }

        if times.len() < 2 {
            return Err(DataError::Format {
                path: path_str,
                reason: "need at least two samples".to_string(),
            });
        }

        let dt = times[1] - times[0];
        if dt <= 0.0 {
            return Err(DataError::Format {
                path: path_str,
                reason: "time stamps must be strictly increasing".to_string(),
            });
        }

        Ok(StrainSeries::new(
            Array1::from(values),
            1.0 / dt,
            times[0],
        ))
    }

    /// Write a strain series as `time value` lines.
    pub fn save<P: AsRef<Path>>(series: &StrainSeries, path: P) -> DataResult<()> {
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        for (i, v) in series.samples.iter().enumerate() {
            writeln!(writer, "{:.9} {:e}", series.time_at(i), v)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Filename of a simulated binary-black-hole signal injected into real
/// detector noise.
///
/// `m1`/`m2` are the component masses, `noise_scale` the sweep identifier
/// (e.g. "s0.01"), `train_event` the event whose background noise the signal
/// was injected into.
pub fn simulated_signal_filename(
    m1: u32,
    m2: u32,
    noise_scale: &str,
    train_event: &str,
) -> String {
    format!(
        "gwpy_hc_mass1_{}_mass2_{}real_data_noise_{}_from_{}_.txt",
        m1, m2, noise_scale, train_event
    )
}

/// Filename of the long band-pass/notch-filtered background-noise series
/// recorded around `train_event`.
pub fn background_noise_filename(train_event: &str) -> String {
    format!(
        "different_noise_long_training_data_noise_bp_and_notch_filtered_{}.txt",
        train_event
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let series = StrainSeries::new(array![1e-21, 2e-21, -1e-21, 0.5e-21], 4.0, 100.0);

        let dir = tempdir().unwrap();
        let path = dir.path().join("series.txt");

        SeriesLoader::save(&series, &path).unwrap();
        let loaded = SeriesLoader::load(&path).unwrap();

        assert_eq!(loaded.len(), 4);
        assert!((loaded.sample_rate - 4.0).abs() < 1e-6);
        assert!((loaded.t0 - 100.0).abs() < 1e-9);
        for (a, b) in loaded.samples.iter().zip(series.samples.iter()) {
            assert!((a - b).abs() < 1e-27);
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = SeriesLoader::load("no_such_file.txt").unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("series.txt");
        std::fs::write(&path, "# header\n0.0 1.0\n\n0.5 2.0\n1.0 3.0\n").unwrap();

        let loaded = SeriesLoader::load(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert!((loaded.sample_rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_filename_scheme() {
        assert_eq!(
            simulated_signal_filename(31, 23, "s0.01", "GW150914"),
            "gwpy_hc_mass1_31_mass2_23real_data_noise_s0.01_from_GW150914_.txt"
        );
        assert_eq!(
            background_noise_filename("GW150914"),
            "different_noise_long_training_data_noise_bp_and_notch_filtered_GW150914.txt"
        );
    }
}
