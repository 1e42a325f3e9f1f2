//! IBM Quantum adapter.
//!
//! Runs Landau-Zener sweep circuits on IBM Quantum devices through the
//! Sampler primitive and reads per-qubit readout calibration from the
//! backend properties endpoint.
//!
//! # Authentication
//!
//! - Cloud API: `IBM_API_KEY` and `IBM_SERVICE_CRN`
//! - Legacy API: `IBM_QUANTUM_TOKEN`
//!
//! # Example
//!
//! ```ignore
//! use landau_adapter_ibm::IbmBackend;
//! use landau_hal::Backend;
//!
//! let backend = IbmBackend::connect("ibm_torino").await?;
//! let readout = backend.properties().await?.readout_error(0)?;
//! let job_id = backend.submit(&circuit, 5000).await?;
//! let result = backend.wait(&job_id).await?;
//! ```

mod api;
mod backend;
mod error;

pub use backend::{DEFAULT_BACKEND, IbmBackend};
pub use error::{IbmError, IbmResult};
