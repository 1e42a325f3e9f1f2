//! Run command implementation.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use landau_sweep::{SweepReport, run_sweep_with};

use super::common::{OutputFormat, SimOptions, SweepOverrides, create_backend, fmt_pair, load_config};

/// Execute the run command.
pub async fn execute(
    config_path: Option<&str>,
    backend: &str,
    overrides: &SweepOverrides,
    sim: &SimOptions,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let table = format == OutputFormat::Table;

    if table {
        println!(
            "{} Sweeping τ={} Δ={} on {} ({} points, {} shots)",
            style("→").cyan().bold(),
            config.hamiltonian.annealing_time,
            config.hamiltonian.gap,
            style(backend).yellow(),
            config.schedule.points,
            config.shots
        );
    }

    let backend_impl = create_backend(backend, sim).await?;

    let progress = if table {
        let bar = ProgressBar::new(config.schedule.points as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=> "),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let report = run_sweep_with(backend_impl.as_ref(), &config, |point| {
        progress.set_message(format!("t = {:.3}", point.time));
        progress.inc(1);
    })
    .await;
    progress.finish_and_clear();
    let report = report.context("Sweep failed")?;

    match format {
        OutputFormat::Table => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn print_report(report: &SweepReport) {
    println!();
    println!(
        "  {:>3}  {:>9}  {:>5}  {:>17}  {:>17}  {:>17}",
        style("#").bold(),
        style("t").bold(),
        style("steps").bold(),
        style("raw P0 / P1").bold(),
        style("calibrated").bold(),
        style("ideal").bold()
    );
    for point in &report.points {
        println!(
            "  {:>3}  {:>9.4}  {:>5}  {:>17}  {:>17}  {:>17}",
            point.index,
            point.time,
            point.steps,
            fmt_pair(point.raw),
            fmt_pair(point.calibrated),
            fmt_pair(point.ideal)
        );
    }
    println!();

    match report.readout {
        Some(r) => println!(
            "  Readout (q{}): P(1|0)={:.4}  P(0|1)={:.4}  [{}]",
            report.target, r.prob_meas1_prep0, r.prob_meas0_prep1, report.calibration
        ),
        None => println!("  Readout: {}", style("uncorrected").dim()),
    }
    println!("  Max |calibrated - ideal|: {:.4}", report.max_deviation());
    println!(
        "  Asymptotic diabatic probability: {:.4}",
        report.diabatic_probability
    );
    println!(
        "\n{} {} points on {}",
        style("✓").green().bold(),
        report.points.len(),
        style(&report.backend).yellow()
    );
}
