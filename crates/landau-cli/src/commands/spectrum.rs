//! Spectrum command implementation.

use anyhow::Result;
use console::style;
use serde::Serialize;

use landau_sim::LandauZener;

use super::common::OutputFormat;

/// H(t) with its eigen-decomposition.
#[derive(Debug, Serialize)]
struct SpectrumReport {
    time: f64,
    annealing_time: f64,
    gap: f64,
    /// Rows of H(t) as `[re, im]` pairs.
    hamiltonian: Vec<Vec<[f64; 2]>>,
    energies: [f64; 2],
    /// Ground state amplitudes as `[re, im]` pairs.
    ground_state: [[f64; 2]; 2],
    ground_probabilities: [f64; 2],
    diabatic_probability: f64,
}

/// Execute the spectrum command.
pub fn execute(time: f64, annealing_time: f64, gap: f64, format: OutputFormat) -> Result<()> {
    let model = LandauZener::new(annealing_time, gap)?;
    let h = model.hamiltonian(time);
    let ground = model.ground_state(time)?;

    let report = SpectrumReport {
        time,
        annealing_time,
        gap,
        hamiltonian: h
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|z| [z.re, z.im]).collect())
            .collect(),
        energies: model.energies(time),
        ground_state: ground.map(|z| [z.re, z.im]),
        ground_probabilities: ground.map(|z| z.norm_sqr()),
        diabatic_probability: model.diabatic_transition_probability(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &SpectrumReport) {
    println!(
        "{} H(t) at t={} (τ={}, Δ={})\n",
        style("→").cyan().bold(),
        report.time,
        report.annealing_time,
        report.gap
    );
    for row in &report.hamiltonian {
        let cells: Vec<String> = row
            .iter()
            .map(|[re, im]| format!("{re:>9.4}{im:+.4}i"))
            .collect();
        println!("  [ {} ]", cells.join("  "));
    }
    println!();
    println!(
        "  Energies:      E0={:.6}  E1={:.6}",
        report.energies[0], report.energies[1]
    );
    let [a, b] = report.ground_state;
    println!(
        "  Ground state:  {:.4}{:+.4}i |0⟩ + {:.4}{:+.4}i |1⟩",
        a[0], a[1], b[0], b[1]
    );
    println!(
        "  P(0), P(1):    {:.4}, {:.4}",
        report.ground_probabilities[0], report.ground_probabilities[1]
    );
    println!(
        "  Asymptotic diabatic probability: {:.4}",
        report.diabatic_probability
    );
}
