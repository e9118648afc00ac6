//! gw_classify - classical vs. quantum-kernel SVM on LIGO strain windows
//!
//! This is the main entry point driving the experiment:
//!
//! ```bash
//! # populate the strain cache for all catalog events
//! cargo run --release -- fetch
//!
//! # run the full sweep (expects the simulated-signal files in ./training_data)
//! cargo run --release -- run --data-dir training_data --out-dir results
//!
//! # inspect the temporal feature table of one event
//! cargo run --release -- features --event GW150914
//! ```

use clap::{Parser, Subcommand};
use gw_classify::api::{GwoscClient, EVENT_CATALOG};
use gw_classify::data::windows::Windower;
use gw_classify::dsp::preprocess;
use gw_classify::experiment::{self, ExperimentConfig, WindowBounds};
use gw_classify::features::TemporalExtractor;
use gw_classify::quantum::SpsaConfig;
use gw_classify::report;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "gw_classify")]
#[command(about = "Classical vs. quantum-kernel SVM on gravitational-wave strain windows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and cache strain segments for the catalog events
    Fetch {
        /// Event to fetch (all catalog events when omitted)
        #[arg(short, long)]
        event: Option<String>,

        /// Detector (e.g. H1, L1)
        #[arg(short, long, default_value = "H1")]
        detector: String,

        /// Strain cache directory
        #[arg(short, long, default_value = "strain_cache")]
        cache_dir: PathBuf,
    },

    /// Run the full noise-scale sweep and write plots + CSV
    Run {
        /// Directory holding simulated-signal and background-noise files
        #[arg(long, default_value = "training_data")]
        data_dir: PathBuf,

        /// Strain cache directory
        #[arg(long, default_value = "strain_cache")]
        cache_dir: PathBuf,

        /// Output directory for plots and CSV
        #[arg(short, long, default_value = "results")]
        out_dir: PathBuf,

        /// SVM box constraint
        #[arg(long, default_value = "2.0")]
        c: f64,

        /// RBF kernel width
        #[arg(long, default_value = "1.0")]
        gamma: f64,

        /// SPSA iterations for the quantum kernel
        #[arg(long, default_value = "300")]
        iterations: usize,

        /// SPSA learning rate
        #[arg(long, default_value = "0.02")]
        learning_rate: f64,

        /// Restrict the sweep to these noise-scale ids (e.g. s0.01)
        #[arg(long)]
        sweep: Vec<String>,

        /// Stop windowing at the end of the series instead of reproducing
        /// the original fixed window count
        #[arg(long)]
        bounded_windows: bool,
    },

    /// Print the temporal feature table of one event's windows
    Features {
        /// Event name
        #[arg(short, long, default_value = "GW150914")]
        event: String,

        /// Detector (e.g. H1, L1)
        #[arg(short, long, default_value = "H1")]
        detector: String,

        /// Strain cache directory
        #[arg(short, long, default_value = "strain_cache")]
        cache_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            event,
            detector,
            cache_dir,
        } => {
            let client = GwoscClient::new(&cache_dir);
            let events: Vec<String> = match event {
                Some(e) => vec![e],
                None => EVENT_CATALOG.iter().map(|(n, _)| n.to_string()).collect(),
            };

            for event in &events {
                let gps = GwoscClient::event_gps(event)?;
                info!(%event, gps, "fetching");
                let series = client
                    .fetch_segment(
                        event,
                        &detector,
                        gps as i64 - experiment::SEGMENT_BEFORE,
                        gps as i64 + experiment::SEGMENT_AFTER,
                    )
                    .await?;
                info!(
                    %event,
                    samples = series.len(),
                    sample_rate = series.sample_rate,
                    "cached"
                );
            }
        }

        Commands::Run {
            data_dir,
            cache_dir,
            out_dir,
            c,
            gamma,
            iterations,
            learning_rate,
            sweep,
            bounded_windows,
        } => {
            let mut config = ExperimentConfig {
                data_dir,
                cache_dir,
                out_dir: out_dir.clone(),
                c,
                gamma,
                optimizer: SpsaConfig {
                    max_iter: iterations,
                    learning_rate,
                    ..SpsaConfig::default()
                },
                bounds_policy: if bounded_windows {
                    WindowBounds::ToEnd
                } else {
                    WindowBounds::Fixed
                },
                ..ExperimentConfig::default()
            };
            if !sweep.is_empty() {
                config.sweep = config
                    .sweep
                    .into_iter()
                    .filter(|v| sweep.contains(&v.noise_scale))
                    .collect();
                anyhow::ensure!(!config.sweep.is_empty(), "no known sweep value selected");
            }

            let outcomes = experiment::run_sweep(&config).await?;

            for outcome in &outcomes {
                let path = report::plot_loss_convergence(
                    &out_dir,
                    outcome,
                    config.c,
                    config.optimizer.learning_rate,
                )?;
                info!(?path, "loss plot written");
            }
            let path = report::plot_accuracy_comparison(&out_dir, &outcomes, config.c, config.gamma)?;
            info!(?path, "accuracy comparison written");
            let path = report::write_results_csv(&out_dir, &outcomes)?;
            info!(?path, "results CSV written");
            let path = report::write_results_json(&out_dir, &outcomes)?;
            info!(?path, "results JSON written");

            println!("\nAverage balanced accuracy per sweep value");
            println!("==========================================");
            println!("{:>8} {:>12} {:>12}", "s", "RBF", "quantum");
            for outcome in &outcomes {
                println!(
                    "{:>8} {:>12.4} {:>12.4}",
                    outcome.legend,
                    outcome.average_classical(),
                    outcome.average_quantum()
                );
            }
        }

        Commands::Features {
            event,
            detector,
            cache_dir,
        } => {
            let client = GwoscClient::new(&cache_dir);
            let gps = GwoscClient::event_gps(&event)?;
            let raw = client
                .fetch_segment(
                    &event,
                    &detector,
                    gps as i64 - experiment::SEGMENT_BEFORE,
                    gps as i64 + experiment::SEGMENT_AFTER,
                )
                .await?;
            let clean = preprocess(&raw)?;

            let windower = Windower::for_sample_rate(clean.sample_rate);
            let labeled = windower.labeled_windows(
                &clean,
                gps,
                gw_classify::data::windows::BoundsPolicy::ToEnd,
            )?;
            let extractor = TemporalExtractor::new(clean.sample_rate);
            let names = TemporalExtractor::feature_names();

            println!("\n{} windows from {}", labeled.len(), event);
            println!("{:>5} {:>6} {:>24}", "win", "label", "features (first 4)");
            for (i, (window, label)) in labeled.iter().enumerate() {
                let row = extractor.extract(&window.samples)?;
                println!(
                    "{:>5} {:>6} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e}",
                    i, label, row[0], row[1], row[2], row[3]
                );
            }
            println!("\nfeature order: {}", names.join(", "));
        }
    }

    Ok(())
}
