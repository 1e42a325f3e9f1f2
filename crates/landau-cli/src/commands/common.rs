//! Shared helpers for CLI commands.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tracing::info;

use landau_adapter_sim::SimulatorBackend;
use landau_hal::{Backend, ReadoutError};
use landau_sweep::{CalibrationMode, SweepConfig};

#[cfg(feature = "ibm")]
use landau_adapter_ibm::{DEFAULT_BACKEND, IbmBackend};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table.
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Command-line values that replace configuration file values.
#[derive(Debug, Clone, Default, Args)]
pub struct SweepOverrides {
    /// Annealing time τ
    #[arg(long)]
    pub annealing_time: Option<f64>,

    /// Gap Δ
    #[arg(long, allow_hyphen_values = true)]
    pub gap: Option<f64>,

    /// Time of the initial ground state
    #[arg(long, allow_hyphen_values = true)]
    pub t_start: Option<f64>,

    /// Discretization step
    #[arg(long)]
    pub dt: Option<f64>,

    /// Step operators added per grid point
    #[arg(long)]
    pub steps_per_point: Option<usize>,

    /// Number of grid points
    #[arg(short, long)]
    pub points: Option<usize>,

    /// Register width
    #[arg(long)]
    pub num_qubits: Option<u32>,

    /// Measured qubit
    #[arg(long)]
    pub target: Option<u32>,

    /// Shots per job
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// Readout correction (forward, inverse, none)
    #[arg(long)]
    pub calibration: Option<CalibrationMode>,

    /// Job wait budget in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl SweepOverrides {
    /// Write every value that was given into `config`.
    pub fn apply(&self, config: &mut SweepConfig) {
        let h = &mut config.hamiltonian;
        h.annealing_time = self.annealing_time.unwrap_or(h.annealing_time);
        h.gap = self.gap.unwrap_or(h.gap);

        let s = &mut config.schedule;
        s.t_start = self.t_start.unwrap_or(s.t_start);
        s.dt = self.dt.unwrap_or(s.dt);
        s.steps_per_point = self.steps_per_point.unwrap_or(s.steps_per_point);
        s.points = self.points.unwrap_or(s.points);

        let r = &mut config.register;
        r.num_qubits = self.num_qubits.unwrap_or(r.num_qubits);
        r.target = self.target.unwrap_or(r.target);

        config.shots = self.shots.unwrap_or(config.shots);
        config.calibration = self.calibration.unwrap_or(config.calibration);
        if let Some(secs) = self.timeout {
            config.wait.timeout_secs = Some(secs);
        }
    }
}

/// Options of the local simulator backend.
#[derive(Debug, Clone, Default, Args)]
pub struct SimOptions {
    /// Sampler seed (simulator only)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulated P(meas 1 | prep 0) on every qubit (simulator only)
    #[arg(long, default_value_t = 0.0)]
    pub readout_p01: f64,

    /// Simulated P(meas 0 | prep 1) on every qubit (simulator only)
    #[arg(long, default_value_t = 0.0)]
    pub readout_p10: f64,
}

/// Load a configuration file, or the defaults, and apply overrides.
pub fn load_config(path: Option<&str>, overrides: &SweepOverrides) -> Result<SweepConfig> {
    let mut config = match path {
        Some(path) => {
            info!(path, "loading sweep configuration");
            SweepConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration: {path}"))?
        }
        None => SweepConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("Invalid sweep configuration")?;
    Ok(config)
}

/// Create a backend by name.
pub async fn create_backend(name: &str, sim: &SimOptions) -> Result<Box<dyn Backend>> {
    match name.to_lowercase().as_str() {
        "simulator" | "sim" => {
            let readout = ReadoutError::new(sim.readout_p01, sim.readout_p10)?;
            let mut backend = SimulatorBackend::new().with_readout_error(readout);
            if let Some(seed) = sim.seed {
                backend = backend.with_seed(seed);
            }
            Ok(Box::new(backend))
        }
        #[cfg(feature = "ibm")]
        other if other == "ibm" || other.starts_with("ibm_") => {
            let device = if other == "ibm" { DEFAULT_BACKEND } else { other };
            eprintln!("  Connecting to IBM Quantum ({device})...");
            let backend = IbmBackend::connect(device).await.with_context(|| {
                "Failed to connect to IBM Quantum. Set IBM_API_KEY + IBM_SERVICE_CRN (or IBM_QUANTUM_TOKEN)."
            })?;
            Ok(Box::new(backend))
        }
        #[cfg(not(feature = "ibm"))]
        other if other == "ibm" || other.starts_with("ibm_") => {
            anyhow::bail!("IBM backend not available. Rebuild with --features ibm");
        }
        other => {
            anyhow::bail!("Unknown backend: '{other}'. Available: simulator, ibm, ibm_<device>")
        }
    }
}

/// Format a probability pair.
pub fn fmt_pair(p: [f64; 2]) -> String {
    format!("{:.4} / {:.4}", p[0], p[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_only_touch_given_values() {
        let mut config = SweepConfig::default();
        let overrides = SweepOverrides {
            gap: Some(0.25),
            points: Some(3),
            calibration: Some(CalibrationMode::Inverse),
            ..SweepOverrides::default()
        };
        overrides.apply(&mut config);
        assert_eq!(config.hamiltonian.gap, 0.25);
        assert_eq!(config.hamiltonian.annealing_time, 1.0);
        assert_eq!(config.schedule.points, 3);
        assert_eq!(config.calibration, CalibrationMode::Inverse);
        assert_eq!(config.shots, 5000);
    }

    #[test]
    fn test_load_config_validates_overrides() {
        let overrides = SweepOverrides {
            target: Some(4),
            ..SweepOverrides::default()
        };
        assert!(load_config(None, &overrides).is_err());
    }

    #[test]
    fn test_fmt_pair() {
        assert_eq!(fmt_pair([0.25, 0.75]), "0.2500 / 0.7500");
    }

    #[tokio::test]
    async fn test_unknown_backend() {
        let err = create_backend("quantum_computer_9000", &SimOptions::default())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Unknown backend"));
    }
}
