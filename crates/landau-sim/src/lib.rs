//! `landau-sim`: Landau-Zener physics for sweep experiments.
//!
//! - [`hamiltonian`]: H(t) and the asymptotic transition probability
//! - [`spectrum`]: closed-form 2x2 Hermitian eigen-decomposition and the
//!   ground state
//! - [`expm`]: Padé(13) matrix exponential
//! - [`evolution`]: step operators `exp(-i H(t_k) dt)`, sweep circuits, and
//!   the noiseless reference
//!
//! # Quick start
//!
//! ```rust
//! use landau_ir::QubitId;
//! use landau_sim::{LandauZener, SweepEvolution, TimeGrid};
//!
//! let model = LandauZener::new(1.0, 1.0).unwrap();
//! let grid = TimeGrid::new(-10.0, 1.0, 5, 5).unwrap();
//! let evolution = SweepEvolution::new(model, grid).unwrap();
//!
//! let circuit = evolution.circuit(2, 1, QubitId(0)).unwrap();
//! assert_eq!(circuit.gate_count(), 10);
//! ```

pub mod error;
pub mod evolution;
pub mod expm;
pub mod hamiltonian;
pub mod spectrum;

pub use error::{SimError, SimResult};
pub use evolution::{MAX_TOTAL_STEPS, SweepEvolution, TimeGrid, step_unitary};
pub use hamiltonian::{LandauZener, diabatic_transition_probability, lz_hamiltonian};
pub use spectrum::{Eigensystem, eigh, ground_state};
