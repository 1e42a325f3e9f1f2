//! `OpenQASM` 3 emitter for Landau circuits.
//!
//! Serializes a [`landau_ir::Circuit`] into `OpenQASM` 3.0 source that a
//! hardware provider accepts. Two gate bases are supported:
//!
//! | Basis | Arbitrary unitary | State preparation |
//! |-------|-------------------|-------------------|
//! | [`GateBasis::Universal`] | `U(θ, φ, λ) q[i];` | `reset q[i]; U(θ, φ, 0) q[i];` |
//! | [`GateBasis::Native`] | `rz`/`sx` sequence | `reset q[i];` then `rz`/`sx` |
//!
//! # Example
//!
//! ```rust
//! use landau_ir::{Circuit, QubitId};
//! use landau_qasm3::{GateBasis, emit};
//!
//! let mut circuit = Circuit::with_size("flip", 1, 1);
//! circuit.x(QubitId(0)).unwrap();
//! circuit.measure_all().unwrap();
//!
//! let qasm = emit(&circuit, GateBasis::Native).unwrap();
//! assert!(qasm.contains("x q[0];"));
//! assert!(qasm.contains("c[0] = measure q[0];"));
//! ```

mod emitter;
mod error;

pub use emitter::{GateBasis, emit, native_sequence};
pub use error::{EmitError, EmitResult};
