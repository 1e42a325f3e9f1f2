//! Tests for discretized Landau-Zener evolution.

use landau_ir::{InstructionKind, QubitId};
use landau_sim::{LandauZener, SweepEvolution, TimeGrid};

fn evolve(tau: f64, gap: f64, grid: TimeGrid) -> SweepEvolution {
    SweepEvolution::new(LandauZener::new(tau, gap).unwrap(), grid).unwrap()
}

// ---------------------------------------------------------------------------
// Circuit structure
// ---------------------------------------------------------------------------

#[test]
fn point_zero_is_preparation_and_measurement_only() {
    let evolution = evolve(1.0, 1.0, TimeGrid::new(-10.0, 1.0, 5, 5).unwrap());
    let circuit = evolution.circuit(0, 1, QubitId(0)).unwrap();
    let kinds: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
    assert_eq!(kinds, vec!["initialize", "measure"]);
}

#[test]
fn steps_grow_linearly_with_point() {
    let evolution = evolve(1.0, 1.0, TimeGrid::new(-10.0, 1.0, 5, 5).unwrap());
    for point in 0..5 {
        let circuit = evolution.circuit(point, 1, QubitId(0)).unwrap();
        assert_eq!(circuit.gate_count(), 5 * point);
    }
}

#[test]
fn circuits_share_step_operators() {
    let evolution = evolve(1.0, 1.0, TimeGrid::new(-10.0, 1.0, 2, 3).unwrap());
    let short = evolution.circuit(1, 1, QubitId(0)).unwrap();
    let long = evolution.circuit(2, 1, QubitId(0)).unwrap();
    let gates = |c: &landau_ir::Circuit| {
        c.instructions()
            .iter()
            .filter_map(|i| i.as_gate().map(|g| g.matrix()))
            .collect::<Vec<_>>()
    };
    assert_eq!(gates(&short)[..], gates(&long)[..2]);
}

#[test]
fn initial_state_is_prepared_on_target_only() {
    let evolution = evolve(1.0, 1.0, TimeGrid::new(-10.0, 1.0, 1, 2).unwrap());
    let circuit = evolution.circuit(1, 3, QubitId(1)).unwrap();
    for inst in circuit.instructions() {
        match &inst.kind {
            InstructionKind::Initialize { state } => {
                assert_eq!(inst.qubits, vec![QubitId(1)]);
                assert_eq!(*state, evolution.initial_state());
            }
            InstructionKind::Gate(_) => assert_eq!(inst.qubits, vec![QubitId(1)]),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Physics of the noiseless reference
// ---------------------------------------------------------------------------

#[test]
fn zero_gap_never_transitions() {
    let evolution = evolve(1.0, 0.0, TimeGrid::new(-10.0, 1.0, 5, 5).unwrap());
    for point in 0..5 {
        let [p0, p1] = evolution.ideal_probabilities(point).unwrap();
        assert!((p0 - 1.0).abs() < 1e-12);
        assert!(p1.abs() < 1e-12);
    }
}

#[test]
fn slow_sweep_follows_ground_state() {
    // t/τ runs from -10 to +10; the ground state moves from |0⟩ to |1⟩.
    let evolution = evolve(50.0, 1.0, TimeGrid::new(-500.0, 0.5, 2000, 2).unwrap());
    let [p0, p1] = evolution.ideal_probabilities(1).unwrap();
    assert!(p1 > 0.9, "p1 = {p1}");
    assert!((p0 + p1 - 1.0).abs() < 1e-9);
}

#[test]
fn fast_sweep_stays_diabatic() {
    let model = LandauZener::new(0.01, 1.0).unwrap();
    let evolution = SweepEvolution::new(model, TimeGrid::new(-0.1, 0.001, 200, 2).unwrap()).unwrap();
    let [p0, _] = evolution.ideal_probabilities(1).unwrap();
    assert!(model.diabatic_transition_probability() > 0.98);
    assert!(p0 > 0.9, "p0 = {p0}");
}
