//! Landau Hardware Abstraction Layer
//!
//! A unified interface for running sweep circuits on simulators and cloud
//! quantum processors:
//! - the [`Backend`] trait for job submission, polling, and calibration data
//! - [`Capabilities`] describing qubit count and gate support
//! - [`BackendProperties`] with per-qubit [`ReadoutError`] rates
//! - [`ExecutionResult`] and [`Counts`] for measurement histograms
//!
//! # Supported Backends
//!
//! | Backend | Crate | Authentication |
//! |---------|-------|----------------|
//! | Local Simulator | `landau-adapter-sim` | None |
//! | IBM Quantum | `landau-adapter-ibm` | `IBM_API_KEY` + `IBM_SERVICE_CRN`, or `IBM_QUANTUM_TOKEN` |
//!
//! # Example
//!
//! ```ignore
//! use landau_hal::Backend;
//! use landau_adapter_sim::SimulatorBackend;
//! use landau_ir::{Circuit, QubitId};
//!
//! let mut circuit = Circuit::with_size("flip", 1, 1);
//! circuit.x(QubitId(0))?;
//! circuit.measure_all()?;
//!
//! let backend = SimulatorBackend::new();
//! let job_id = backend.submit(&circuit, 1000).await?;
//! let result = backend.wait(&job_id).await?;
//! assert_eq!(result.counts.get("1"), 1000);
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod properties;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult, WaitPolicy,
};
pub use capability::{Capabilities, GateSet};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use properties::{BackendProperties, QubitProperties, ReadoutError};
pub use result::{Counts, ExecutionResult};
