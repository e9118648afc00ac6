//! Result aggregation, plots and CSV export
//!
//! Renders the two comparison figures of the study (quantum kernel loss
//! convergence per sweep value, average balanced accuracy of both classifiers
//! across the sweep) and writes the per-event accuracy table as CSV.

use crate::experiment::SweepOutcome;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// Render the loss-convergence plot of one sweep iteration.
///
/// The filename embeds the box constraint, the learning rate (with the
/// decimal point spelled "dot") and the sweep legend, e.g.
/// `Loss_evolution_C_2_learning_rate_0dot02_s_1E-2.png`.
pub fn plot_loss_convergence(
    out_dir: &Path,
    outcome: &SweepOutcome,
    c: f64,
    learning_rate: f64,
) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let lr_label = format!("{}", learning_rate).replace('.', "dot");
    let path = out_dir.join(format!(
        "Loss_evolution_C_{}_learning_rate_{}_s_{}.png",
        c, lr_label, outcome.legend
    ));

    let losses = &outcome.loss_trace;
    if losses.is_empty() {
        anyhow::bail!("no loss trajectory recorded for {}", outcome.legend);
    }
    let (min_loss, max_loss) = losses.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    let margin = (max_loss - min_loss).max(1e-6) * 0.1;

    let path_for_backend = path.clone();
    let root = BitMapBackend::new(&path_for_backend, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "Loss evolution, C = {}, learning rate = {}, s = {}",
                c, learning_rate, outcome.legend
            ),
            ("sans-serif", 28),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            1.0..losses.len() as f64,
            (min_loss - margin)..(max_loss + margin),
        )?;

    chart
        .configure_mesh()
        .x_desc("Iterations")
        .y_desc("Loss")
        .draw()?;

    chart.draw_series(LineSeries::new(
        losses.iter().enumerate().map(|(i, &l)| (i as f64 + 1.0, l)),
        &BLACK,
    ))?;
    chart.draw_series(
        losses
            .iter()
            .enumerate()
            .map(|(i, &l)| Circle::new((i as f64 + 1.0, l), 3, BLACK.filled())),
    )?;

    root.present().context("writing loss plot")?;
    Ok(path)
}

/// Render the final accuracy-vs-sweep-parameter comparison of both
/// classifiers.
pub fn plot_accuracy_comparison(
    out_dir: &Path,
    outcomes: &[SweepOutcome],
    c: f64,
    gamma: f64,
) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(format!(
        "Q_Classical_Average_accuracy_temporal_C_{}_gamma_{}.png",
        c, gamma
    ));

    if outcomes.is_empty() {
        anyhow::bail!("no sweep outcomes to plot");
    }

    let path_for_backend = path.clone();
    let root = BitMapBackend::new(&path_for_backend, (1400, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let n = outcomes.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!(
                "Average balanced accuracy, temporal features, C = {} gamma = {}",
                c, gamma
            ),
            ("sans-serif", 26),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..1.0)?;

    let legends: Vec<String> = outcomes.iter().map(|o| o.legend.clone()).collect();
    chart
        .configure_mesh()
        .x_desc("parameter s")
        .y_desc("average balanced accuracy")
        .x_labels(n)
        .x_label_formatter(&|x| {
            let idx = x.round() as usize;
            legends.get(idx).cloned().unwrap_or_default()
        })
        .draw()?;

    chart
        .draw_series(outcomes.iter().enumerate().map(|(i, o)| {
            Circle::new((i as f64, o.average_classical()), 5, RED.filled())
        }))?
        .label("RBF kernel")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));

    chart
        .draw_series(outcomes.iter().enumerate().map(|(i, o)| {
            Circle::new((i as f64, o.average_quantum()), 5, GREEN.filled())
        }))?
        .label("covariant feature map")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, GREEN.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::MiddleRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present().context("writing accuracy plot")?;
    Ok(path)
}

/// Write per-event balanced accuracies of both classifiers as CSV.
pub fn write_results_csv(out_dir: &Path, outcomes: &[SweepOutcome]) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join("balanced_accuracies.csv");
    let mut writer = csv::Writer::from_path(&path)?;

    writer.write_record(["noise_scale", "legend", "event", "classical", "quantum"])?;
    for outcome in outcomes {
        for ((event, classical), quantum) in outcome
            .events
            .iter()
            .zip(outcome.classical_accuracies.iter())
            .zip(outcome.quantum_accuracies.iter())
        {
            writer.write_record([
                outcome.noise_scale.as_str(),
                outcome.legend.as_str(),
                event.as_str(),
                &format!("{:.6}", classical),
                &format!("{:.6}", quantum),
            ])?;
        }
        writer.write_record([
            outcome.noise_scale.as_str(),
            outcome.legend.as_str(),
            "average",
            &format!("{:.6}", outcome.average_classical()),
            &format!("{:.6}", outcome.average_quantum()),
        ])?;
    }
    writer.flush()?;
    Ok(path)
}

/// Write the complete sweep outcomes (including loss traces) as JSON, for
/// downstream analysis without re-running the experiment.
pub fn write_results_json(out_dir: &Path, outcomes: &[SweepOutcome]) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join("sweep_outcomes.json");
    let file = std::fs::File::create(&path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), outcomes)
        .context("serializing sweep outcomes")?;
    Ok(path)
}
