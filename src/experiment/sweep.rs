//! Sweep execution
//!
//! Runs the full pipeline once per sweep value and returns one
//! [`SweepOutcome`] record per value, in order. No state is shared between
//! iterations; every dataset and model is rebuilt from scratch.

use super::{ExperimentConfig, SEGMENT_AFTER, SEGMENT_BEFORE, TEST_SEGMENT_SECONDS, TRAIN_NOISE_SECONDS};
use crate::api::GwoscClient;
use crate::data::loader::{background_noise_filename, simulated_signal_filename, SeriesLoader};
use crate::data::types::{Dataset, Window};
use crate::data::windows::{BoundsPolicy, Windower};
use crate::dsp::{preprocess, tukey};
use crate::features::{FeaturePipeline, TemporalExtractor};
use crate::ml::{Kernel, Metrics, SvmClassifier};
use crate::quantum::{CovariantFeatureMap, QuantumKernel, QuantumKernelTrainer};
use anyhow::{Context, Result};
use ndarray::{Array1, Array2};
use tracing::info;

/// Preprocessed, windowed and labeled test data for one event.
#[derive(Debug, Clone)]
pub struct EventWindows {
    pub event: String,
    pub gps: f64,
    pub sample_rate: f64,
    pub windows: Vec<Window>,
    pub labels: Array1<f64>,
}

/// Results of one sweep iteration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SweepOutcome {
    /// Sweep file identifier (e.g. "s0.01")
    pub noise_scale: String,
    /// Display label (e.g. "1E-2")
    pub legend: String,
    /// Events in evaluation order
    pub events: Vec<String>,
    /// Per-event balanced accuracy of the RBF SVM
    pub classical_accuracies: Vec<f64>,
    /// Per-event balanced accuracy of the quantum-kernel SVM
    pub quantum_accuracies: Vec<f64>,
    /// Quantum kernel training loss per SPSA iteration
    pub loss_trace: Vec<f64>,
}

impl SweepOutcome {
    pub fn average_classical(&self) -> f64 {
        mean(&self.classical_accuracies)
    }

    pub fn average_quantum(&self) -> f64 {
        mean(&self.quantum_accuracies)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Fetch, filter and window one test event.
pub async fn process_event(
    client: &GwoscClient,
    config: &ExperimentConfig,
    event: &str,
) -> Result<EventWindows> {
    let gps = GwoscClient::event_gps(event)?;
    let raw = client
        .fetch_segment(
            event,
            &config.detector,
            gps as i64 - SEGMENT_BEFORE,
            gps as i64 + SEGMENT_AFTER,
        )
        .await
        .with_context(|| format!("fetching strain for {}", event))?;

    let clean = preprocess(&raw).with_context(|| format!("filtering strain for {}", event))?;

    let fs = clean.sample_rate;
    let windower = Windower::for_sample_rate(fs);
    let policy =
        config
            .bounds_policy
            .resolve(TEST_SEGMENT_SECONDS, fs, windower.window_len, windower.hop);
    let labeled = windower
        .labeled_windows(&clean, gps, policy)
        .with_context(|| format!("windowing {}", event))?;

    let labels = labeled.iter().map(|(_, l)| *l as f64).collect();
    let windows = labeled.into_iter().map(|(w, _)| w).collect();

    Ok(EventWindows {
        event: event.to_string(),
        gps,
        sample_rate: fs,
        windows,
        labels,
    })
}

/// Assemble the training windows for one sweep value: simulated-signal files
/// over the mass grid (labeled +1) followed by windows cut from the long
/// background-noise series of each training event (labeled -1).
fn load_training_windows(
    config: &ExperimentConfig,
    noise_scale: &str,
    sample_rate: f64,
) -> Result<(Vec<Window>, Array1<f64>)> {
    let mut windows = Vec::new();
    let mut labels = Vec::new();

    let (m1_start, m2_start, n) = config.mass_grid;
    for train_event in &config.train_events {
        for i in 0..n {
            for j in 0..n {
                let name =
                    simulated_signal_filename(m1_start + i, m2_start + j, noise_scale, train_event);
                let path = config.data_dir.join(&name);
                let series = SeriesLoader::load(&path)
                    .with_context(|| format!("loading simulated signal {}", name))?;
                let taper = tukey(series.len(), 0.5);
                windows.push(Window {
                    samples: &series.samples * &taper,
                    start_time: series.t0,
                    end_time: series.time_at(series.len().saturating_sub(1)),
                });
                labels.push(1.0);
            }
        }
    }

    // non-overlapping 0.25 s noise windows, 4 per second of background
    let noise_window = (0.25 * sample_rate).round() as usize;
    let windower = Windower::new(noise_window, noise_window);
    let count = (TRAIN_NOISE_SECONDS * 4.0) as usize;
    for train_event in &config.train_events {
        let name = background_noise_filename(train_event);
        let path = config.data_dir.join(&name);
        let series = SeriesLoader::load(&path)
            .with_context(|| format!("loading background noise {}", name))?;
        let noise_windows = windower
            .windows(&series, BoundsPolicy::FixedCount(count))
            .with_context(|| format!("windowing background noise {}", name))?;
        for w in noise_windows {
            windows.push(w);
            labels.push(-1.0);
        }
    }

    Ok((windows, Array1::from(labels)))
}

/// Run the full sweep, returning one outcome record per sweep value.
pub async fn run_sweep(config: &ExperimentConfig) -> Result<Vec<SweepOutcome>> {
    let client = GwoscClient::new(&config.cache_dir);
    let mut outcomes = Vec::with_capacity(config.sweep.len());

    for value in &config.sweep {
        info!(noise_scale = %value.noise_scale, "starting sweep iteration");

        let mut event_data = Vec::with_capacity(config.events.len());
        for event in &config.events {
            event_data.push(process_event(&client, config, event).await?);
        }
        let fs = event_data
            .first()
            .map(|e| e.sample_rate)
            .context("no test events configured")?;

        let (train_windows, y_train) = load_training_windows(config, &value.noise_scale, fs)?;
        info!(
            train_windows = train_windows.len(),
            events = event_data.len(),
            "datasets assembled"
        );

        let extractor = TemporalExtractor::new(fs);
        let x_train_raw = extractor.extract_matrix(&train_windows)?;

        let mut pipeline = FeaturePipeline::new();
        let x_train = pipeline.fit_transform(&x_train_raw)?;
        let feature_names = pipeline.select_names(&TemporalExtractor::feature_names())?;
        let train = Dataset::new(x_train, y_train, feature_names);
        let x_tests: Vec<Array2<f64>> = event_data
            .iter()
            .map(|e| {
                let raw = extractor.extract_matrix(&e.windows)?;
                pipeline.transform(&raw)
            })
            .collect::<Result<_, _>>()?;

        info!(
            features = train.n_features(),
            rows = train.n_samples(),
            "feature pipeline fitted"
        );

        // classical RBF SVM
        let mut svc = SvmClassifier::new(
            Kernel::Rbf {
                gamma: config.gamma,
            },
            config.c,
        );
        svc.fit(&train.x, &train.y)?;
        let classical_accuracies: Vec<f64> = event_data
            .iter()
            .zip(x_tests.iter())
            .map(|(e, x_test)| {
                let predictions = svc.predict(x_test)?;
                Ok(Metrics::balanced_accuracy(&e.labels, &predictions))
            })
            .collect::<Result<_>>()?;

        // quantum-kernel SVM
        let feature_map = CovariantFeatureMap::new(train.n_features())?;
        let kernel = QuantumKernel::new(feature_map);
        let trainer = QuantumKernelTrainer::new(config.c, config.optimizer.clone());
        let trained = trainer.fit(&kernel, &train.x, &train.y)?;

        let gram_train = kernel.evaluate_symmetric(&train.x, &trained.parameters)?;
        let mut qsvc = SvmClassifier::new(Kernel::Precomputed, config.c);
        qsvc.fit_precomputed(&gram_train, &train.y)?;

        let quantum_accuracies: Vec<f64> = event_data
            .iter()
            .zip(x_tests.iter())
            .map(|(e, x_test)| {
                let k_test = kernel.evaluate(x_test, &train.x, &trained.parameters)?;
                let predictions = qsvc.predict_precomputed(&k_test)?;
                Ok(Metrics::balanced_accuracy(&e.labels, &predictions))
            })
            .collect::<Result<_>>()?;

        let outcome = SweepOutcome {
            noise_scale: value.noise_scale.clone(),
            legend: value.legend.clone(),
            events: config.events.clone(),
            classical_accuracies,
            quantum_accuracies,
            loss_trace: trained.losses,
        };
        info!(
            classical = outcome.average_classical(),
            quantum = outcome.average_quantum(),
            "sweep iteration finished"
        );
        outcomes.push(outcome);
    }

    Ok(outcomes)
}
