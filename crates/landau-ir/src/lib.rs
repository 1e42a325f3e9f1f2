//! Landau Circuit Intermediate Representation
//!
//! Core data structures for the single-qubit circuits a Landau-Zener sweep
//! submits to a backend.
//!
//! # Core Components
//!
//! - **Qubits and Classical Bits**: [`QubitId`], [`ClbitId`]
//! - **Matrices**: [`Unitary2x2`] with Euler-angle decomposition
//! - **Gates**: [`StandardGate`] for built-in gates and arbitrary unitaries
//!   through [`GateKind::Unitary`]
//! - **Instructions**: [`Instruction`] combining gates with their operands
//! - **Circuit**: [`Circuit`] high-level builder API
//!
//! # Example
//!
//! ```rust
//! use landau_ir::{Circuit, QubitId, Unitary2x2};
//! use num_complex::Complex64;
//!
//! let s = 1.0 / 2.0_f64.sqrt();
//! let mut circuit = Circuit::with_size("lz_point", 1, 1);
//! circuit
//!     .initialize([Complex64::new(s, 0.0), Complex64::new(-s, 0.0)], QubitId(0))
//!     .unwrap()
//!     .unitary(Unitary2x2::rz(0.3), "U_0", QubitId(0))
//!     .unwrap();
//! circuit.measure_all().unwrap();
//!
//! assert_eq!(circuit.num_ops(), 3);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;
pub mod unitary;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::{Gate, GateKind, StandardGate};
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
pub use unitary::{UAngles, Unitary2x2, normalize_angle};
