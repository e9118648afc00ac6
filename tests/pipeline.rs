//! End-to-end pipeline tests on synthetic strain
//!
//! Exercises the offline path: preprocessing, windowing and labeling,
//! feature extraction and the two classifiers, without touching the
//! network or real open data.

use approx::assert_abs_diff_eq;
use gw_classify::data::loader::{background_noise_filename, SeriesLoader};
use gw_classify::data::windows::label_window;
use gw_classify::dsp::preprocess;
use gw_classify::experiment::WindowBounds;
use gw_classify::quantum::SpsaConfig;
use gw_classify::{
    BoundsPolicy, CovariantFeatureMap, FeaturePipeline, Kernel, Metrics, QuantumKernel,
    QuantumKernelTrainer, StrainSeries, SvmClassifier, TemporalExtractor, Window, Windower,
};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FS: f64 = 1024.0;

/// 12 s of band-limited noise with a short oscillation at the event time,
/// starting 2 s before the event.
fn synthetic_segment(gps: f64) -> StrainSeries {
    let mut rng = StdRng::seed_from_u64(7);
    let n = (12.0 * FS) as usize;
    let samples = Array1::from_shape_fn(n, |i| {
        let t = i as f64 / FS;
        let noise: f64 = rng.gen_range(-1.0..1.0);
        // 150 Hz burst lasting 0.1 s around the event, 2 s into the segment
        let burst = if (t - 2.0).abs() < 0.05 {
            10.0 * (2.0 * std::f64::consts::PI * 150.0 * t).sin()
        } else {
            0.0
        };
        noise + burst
    });
    StrainSeries::new(samples, FS, gps - 2.0)
}

fn window_of(samples: Array1<f64>, index: usize) -> Window {
    let start = index as f64 * 0.125;
    Window {
        start_time: start,
        end_time: start + 255.0 / FS,
        samples,
    }
}

fn noise_window(rng: &mut StdRng, index: usize) -> Window {
    let samples = Array1::from_shape_fn(256, |_| rng.gen_range(-1e-3..1e-3));
    window_of(samples, index)
}

fn burst_window(rng: &mut StdRng, index: usize, freq: f64) -> Window {
    let samples = Array1::from_shape_fn(256, |i| {
        let t = i as f64 / FS;
        (2.0 * std::f64::consts::PI * freq * t).sin() + rng.gen_range(-1e-3..1e-3)
    });
    window_of(samples, index)
}

#[test]
fn test_segment_preprocessing_and_window_geometry() {
    let gps = 1_126_259_462.0;
    let raw = synthetic_segment(gps);
    assert_abs_diff_eq!(raw.duration(), 12.0, epsilon = 1e-9);

    let clean = preprocess(&raw).unwrap();
    // edge crops leave the 10 s analysis segment
    assert_abs_diff_eq!(clean.duration(), 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(clean.time_at(0), gps - 1.0, epsilon = 1e-9);

    let windower = Windower::for_sample_rate(clean.sample_rate);
    assert_eq!(windower.window_len, 256);
    assert_eq!(windower.hop, 128);

    let policy = WindowBounds::Fixed.resolve(10.0, FS, windower.window_len, windower.hop);
    assert_eq!(policy, BoundsPolicy::FixedCount(79));

    let labeled = windower.labeled_windows(&clean, gps, policy).unwrap();
    assert_eq!(labeled.len(), 79);

    // hop of fs/8 means exactly two window spans contain the event time
    let positives: Vec<usize> = labeled
        .iter()
        .enumerate()
        .filter(|(_, (_, l))| *l == 1)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(positives.len(), 2);
    assert_eq!(positives[1], positives[0] + 1);

    for (window, label) in &labeled {
        assert_eq!(window.samples.len(), 256);
        assert_eq!(*label, label_window(window.start_time, window.end_time, gps));
    }
}

#[test]
fn test_labeling_is_all_noise_when_event_outside_segment() {
    let gps = 1_126_259_462.0;
    let raw = synthetic_segment(gps);
    let clean = preprocess(&raw).unwrap();
    let windower = Windower::for_sample_rate(clean.sample_rate);

    let labeled = windower
        .labeled_windows(&clean, gps + 3600.0, BoundsPolicy::ToEnd)
        .unwrap();
    assert!(labeled.iter().all(|(_, l)| *l == -1));
}

#[test]
fn test_features_and_rbf_svm_separate_bursts_from_noise() {
    let mut rng = StdRng::seed_from_u64(42);

    let mut train: Vec<Window> = Vec::new();
    let mut y_train: Vec<f64> = Vec::new();
    for i in 0..40 {
        train.push(burst_window(&mut rng, i, 100.0 + i as f64));
        y_train.push(1.0);
        train.push(noise_window(&mut rng, i));
        y_train.push(-1.0);
    }

    let mut test: Vec<Window> = Vec::new();
    let mut y_test: Vec<f64> = Vec::new();
    for i in 0..10 {
        test.push(burst_window(&mut rng, i, 140.5 + i as f64));
        y_test.push(1.0);
        test.push(noise_window(&mut rng, i));
        y_test.push(-1.0);
    }

    let extractor = TemporalExtractor::new(FS);
    let raw_train = extractor.extract_matrix(&train).unwrap();
    let raw_test = extractor.extract_matrix(&test).unwrap();
    assert_eq!(raw_train.ncols(), TemporalExtractor::n_features());

    let mut pipeline = FeaturePipeline::new();
    let x_train = pipeline.fit_transform(&raw_train).unwrap();
    let x_test = pipeline.transform(&raw_test).unwrap();

    // quantum encoding needs an even feature count
    assert_eq!(x_train.ncols() % 2, 0);
    assert_eq!(x_test.ncols(), x_train.ncols());

    // training columns are standardized
    for col in x_train.columns() {
        let mean = col.mean().unwrap();
        let std = col.std(0.0);
        assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(std, 1.0, epsilon = 1e-6);
    }

    let y_train = Array1::from(y_train);
    let y_test = Array1::from(y_test);

    let mut svm = SvmClassifier::new(Kernel::Rbf { gamma: 1.0 }, 2.0);
    svm.fit(&x_train, &y_train).unwrap();
    let predictions = svm.predict(&x_test).unwrap();
    let score = Metrics::balanced_accuracy(&y_test, &predictions);
    assert!(score >= 0.9, "balanced accuracy too low: {}", score);
}

#[test]
fn test_trained_quantum_kernel_classifies_separated_clusters() {
    let mut rng = StdRng::seed_from_u64(3);

    // 4 features -> 2 qubits; two clusters far apart in rotation angle
    let n_per_class = 6;
    let mut rows: Vec<f64> = Vec::new();
    let mut labels: Vec<f64> = Vec::new();
    for _ in 0..n_per_class {
        for f in 0..4 {
            rows.push(0.2 + 0.05 * f as f64 + rng.gen_range(-0.02..0.02));
        }
        labels.push(1.0);
    }
    for _ in 0..n_per_class {
        for f in 0..4 {
            rows.push(2.6 + 0.05 * f as f64 + rng.gen_range(-0.02..0.02));
        }
        labels.push(-1.0);
    }
    let x = Array2::from_shape_vec((2 * n_per_class, 4), rows).unwrap();
    let y = Array1::from(labels);

    let feature_map = CovariantFeatureMap::new(x.ncols()).unwrap();
    assert_eq!(feature_map.n_qubits(), 2);
    let kernel = QuantumKernel::new(feature_map);

    let optimizer = SpsaConfig {
        max_iter: 30,
        ..SpsaConfig::default()
    };
    let trainer = QuantumKernelTrainer::new(2.0, optimizer);
    let trained = trainer.fit(&kernel, &x, &y).unwrap();
    assert_eq!(trained.losses.len(), 30);
    assert!(trained.parameters.iter().all(|p| p.is_finite()));
    assert!(trained.losses.iter().all(|l| l.is_finite()));

    let gram = kernel.evaluate_symmetric(&x, &trained.parameters).unwrap();
    for i in 0..gram.nrows() {
        assert_abs_diff_eq!(gram[[i, i]], 1.0, epsilon = 1e-9);
        for j in 0..gram.ncols() {
            assert_abs_diff_eq!(gram[[i, j]], gram[[j, i]], epsilon = 1e-12);
        }
    }

    let mut qsvc = SvmClassifier::new(Kernel::Precomputed, 2.0);
    qsvc.fit_precomputed(&gram, &y).unwrap();
    let predictions = qsvc.predict_precomputed(&gram).unwrap();
    let score = Metrics::balanced_accuracy(&y, &predictions);
    assert!(score >= 0.9, "balanced accuracy too low: {}", score);
}

#[test]
fn test_background_noise_file_yields_fixed_training_windows() {
    let dir = tempfile::tempdir().unwrap();

    // 25 s of noise at 64 Hz, as written by the noise-preparation step
    let fs = 64.0;
    let mut rng = StdRng::seed_from_u64(11);
    let samples = Array1::from_shape_fn((25.0 * fs) as usize, |_| rng.gen_range(-1.0..1.0));
    let series = StrainSeries::new(samples, fs, 0.0);

    let path = dir.path().join(background_noise_filename("GW150914"));
    SeriesLoader::save(&series, &path).unwrap();
    let loaded = SeriesLoader::load(&path).unwrap();
    assert_eq!(loaded.len(), series.len());
    assert_abs_diff_eq!(loaded.sample_rate, fs, epsilon = 1e-9);

    // non-overlapping 0.25 s windows: exactly 100 from 25 s
    let window_len = (fs / 4.0) as usize;
    let windower = Windower::new(window_len, window_len);
    let windows = windower
        .windows(&loaded, BoundsPolicy::FixedCount(100))
        .unwrap();
    assert_eq!(windows.len(), 100);

    // all of them are noise relative to any far-away event time
    assert!(windows
        .iter()
        .all(|w| label_window(w.start_time, w.end_time, 1e9) == -1));
}
