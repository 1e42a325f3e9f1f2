//! Landau Local Statevector Simulator
//!
//! A [`landau_hal::Backend`] that executes sweep circuits locally. It supports
//! state preparation, arbitrary single-qubit unitaries, and terminal
//! measurements, samples counts from a seedable RNG, and models readout
//! error with a per-qubit bit-flip channel.
//!
//! # Example
//!
//! ```ignore
//! use landau_adapter_sim::SimulatorBackend;
//! use landau_hal::{Backend, ReadoutError};
//!
//! let backend = SimulatorBackend::new()
//!     .with_seed(42)
//!     .with_readout_error(ReadoutError::new(0.02, 0.05)?);
//!
//! let job_id = backend.submit(&circuit, 5000).await?;
//! let result = backend.wait(&job_id).await?;
//! let props = backend.properties().await?;
//! ```

mod simulator;
mod statevector;

pub use simulator::SimulatorBackend;
