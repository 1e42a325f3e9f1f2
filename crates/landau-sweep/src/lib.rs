//! `landau-sweep`: Landau-Zener sweeps on a quantum backend.
//!
//! For each point of a time grid, a circuit prepares the ground state of
//! H(t_start), applies the discretized evolution up to that point, and
//! measures. Counts come back from any [`landau_hal::Backend`], are reduced
//! to the target qubit's `[P(0), P(1)]`, and are corrected with the
//! backend's readout calibration.
//!
//! ```ignore
//! use landau_adapter_sim::SimulatorBackend;
//! use landau_sweep::{SweepConfig, run_sweep};
//!
//! let backend = SimulatorBackend::new().with_seed(7);
//! let report = run_sweep(&backend, &SweepConfig::default()).await?;
//! for point in &report.points {
//!     println!("{:>6.2}  {:.3}  {:.3}", point.time, point.raw[1], point.ideal[1]);
//! }
//! ```

pub mod config;
pub mod error;
pub mod experiment;
pub mod readout;
pub mod report;

pub use config::{HamiltonianConfig, RegisterConfig, ScheduleConfig, SweepConfig, WaitConfig};
pub use error::{SweepError, SweepResult};
pub use experiment::{run_sweep, run_sweep_with};
pub use readout::{CalibrationMode, ConfusionMatrix, qubit_probabilities};
pub use report::{SweepPoint, SweepReport};
