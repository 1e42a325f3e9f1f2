//! Sweep configuration.
//!
//! Loaded from YAML; every section and key is optional and falls back to
//! the defaults below.
//!
//! ```yaml
//! hamiltonian:
//!   annealing_time: 1.0
//!   gap: 1.0
//! schedule:
//!   t_start: -10.0
//!   dt: 1.0
//!   steps_per_point: 5
//!   points: 5
//! register:
//!   num_qubits: 1
//!   target: 0
//! shots: 5000
//! calibration: forward
//! wait:
//!   poll_interval_ms: 500
//!   timeout_secs: 300
//! ```

use std::path::Path;
use std::time::Duration;

use landau_hal::WaitPolicy;
use landau_sim::{LandauZener, MAX_TOTAL_STEPS, TimeGrid};
use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};
use crate::readout::CalibrationMode;

/// Complete sweep configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Model parameters.
    pub hamiltonian: HamiltonianConfig,
    /// Time discretization.
    pub schedule: ScheduleConfig,
    /// Register layout.
    pub register: RegisterConfig,
    /// Shots per job.
    pub shots: u32,
    /// Readout correction.
    pub calibration: CalibrationMode,
    /// Job polling.
    pub wait: WaitConfig,
}

/// Landau-Zener model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HamiltonianConfig {
    /// Sweep time scale τ.
    pub annealing_time: f64,
    /// Coupling Δ at the avoided crossing.
    pub gap: f64,
}

/// Time grid of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Time of the initial ground state.
    pub t_start: f64,
    /// Discretization step.
    pub dt: f64,
    /// Step operators added per grid point.
    pub steps_per_point: usize,
    /// Number of grid points.
    pub points: usize,
}

/// Register layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegisterConfig {
    /// Width of the quantum and classical registers.
    pub num_qubits: u32,
    /// Qubit that carries the two-level system.
    pub target: u32,
}

/// Polling of submitted jobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaitConfig {
    /// Delay between status queries.
    pub poll_interval_ms: u64,
    /// Time budget per job; `null` waits forever.
    pub timeout_secs: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            hamiltonian: HamiltonianConfig::default(),
            schedule: ScheduleConfig::default(),
            register: RegisterConfig::default(),
            shots: 5000,
            calibration: CalibrationMode::default(),
            wait: WaitConfig::default(),
        }
    }
}

impl Default for HamiltonianConfig {
    fn default() -> Self {
        Self {
            annealing_time: 1.0,
            gap: 1.0,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            t_start: -10.0,
            dt: 1.0,
            steps_per_point: 5,
            points: 5,
        }
    }
}

impl Default for RegisterConfig {
    fn default() -> Self {
        Self {
            num_qubits: 1,
            target: 0,
        }
    }
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            timeout_secs: Some(300),
        }
    }
}

impl SweepConfig {
    /// Load and validate a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> SweepResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SweepError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(contents: &str) -> SweepResult<Self> {
        let config: Self = serde_yaml_ng::from_str(contents)
            .map_err(|e| SweepError::Config(format!("invalid YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> SweepResult<String> {
        serde_yaml_ng::to_string(self).map_err(|e| SweepError::Config(e.to_string()))
    }

    /// Reject non-physical or unrunnable values.
    pub fn validate(&self) -> SweepResult<()> {
        let fail = |msg: String| Err(SweepError::Config(msg));

        let h = &self.hamiltonian;
        if !(h.annealing_time.is_finite() && h.annealing_time > 0.0) {
            return fail(format!(
                "hamiltonian.annealing_time must be positive, got {}",
                h.annealing_time
            ));
        }
        if !h.gap.is_finite() {
            return fail(format!("hamiltonian.gap must be finite, got {}", h.gap));
        }

        let s = &self.schedule;
        if !s.t_start.is_finite() {
            return fail(format!("schedule.t_start must be finite, got {}", s.t_start));
        }
        if !(s.dt.is_finite() && s.dt > 0.0) {
            return fail(format!("schedule.dt must be positive, got {}", s.dt));
        }
        if s.points == 0 {
            return fail("schedule.points must be at least 1".into());
        }
        let total_steps = (s.points - 1).checked_mul(s.steps_per_point);
        if !total_steps.is_some_and(|total| total <= MAX_TOTAL_STEPS) {
            return fail(format!(
                "schedule needs more than {MAX_TOTAL_STEPS} step operators \
                 ({} points of {} steps)",
                s.points, s.steps_per_point
            ));
        }

        let r = &self.register;
        if r.num_qubits == 0 {
            return fail("register.num_qubits must be at least 1".into());
        }
        if r.target >= r.num_qubits {
            return fail(format!(
                "register.target {} outside a {}-qubit register",
                r.target, r.num_qubits
            ));
        }

        if self.shots == 0 {
            return fail("shots must be positive".into());
        }
        if self.wait.poll_interval_ms == 0 {
            return fail("wait.poll_interval_ms must be positive".into());
        }
        Ok(())
    }

    /// The model these parameters describe.
    pub fn model(&self) -> SweepResult<LandauZener> {
        Ok(LandauZener::new(
            self.hamiltonian.annealing_time,
            self.hamiltonian.gap,
        )?)
    }

    /// The sweep's time grid.
    pub fn time_grid(&self) -> SweepResult<TimeGrid> {
        let s = &self.schedule;
        Ok(TimeGrid::new(s.t_start, s.dt, s.steps_per_point, s.points)?)
    }

    /// Polling policy for submitted jobs.
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::new(
            Duration::from_millis(self.wait.poll_interval_ms),
            self.wait.timeout_secs.map(Duration::from_secs),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SweepConfig::default();
        assert_eq!(config.shots, 5000);
        assert_eq!(config.schedule.points, 5);
        assert_eq!(config.calibration, CalibrationMode::Forward);
        assert_eq!(config.wait_policy(), WaitPolicy::default());
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(SweepConfig::from_yaml("{}").unwrap(), SweepConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
hamiltonian:
  gap: 0.5
register:
  num_qubits: 3
  target: 2
calibration: inverse
wait:
  timeout_secs: null
"#;
        let config = SweepConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.hamiltonian.gap, 0.5);
        assert_eq!(config.hamiltonian.annealing_time, 1.0);
        assert_eq!(config.register.target, 2);
        assert_eq!(config.calibration, CalibrationMode::Inverse);
        assert_eq!(config.wait_policy().timeout, None);
        assert_eq!(config.shots, 5000);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let mut config = SweepConfig::default();
        config.schedule.dt = 0.25;
        let yaml = config.to_yaml().unwrap();
        assert_eq!(SweepConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(SweepConfig::from_yaml("hamiltonian:\n  tau: 2.0\n").is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = SweepConfig::default();
        config.hamiltonian.annealing_time = 0.0;
        assert!(config.validate().is_err());

        let mut config = SweepConfig::default();
        config.register.target = 1;
        assert!(config.validate().is_err());

        let mut config = SweepConfig::default();
        config.shots = 0;
        assert!(config.validate().is_err());

        let mut config = SweepConfig::default();
        config.schedule.dt = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SweepConfig::default();
        config.schedule.points = 0;
        assert!(config.validate().is_err());
    }
}
