//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - Landau-Zener sweeps on simulators and quantum hardware",
        style("Landau").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  landau-ir           Single-qubit circuit representation");
    println!("  landau-qasm3        OpenQASM 3 emitter");
    println!("  landau-hal          Hardware abstraction layer");
    println!("  landau-sim          Hamiltonian, spectrum, and time evolution");
    println!("  landau-sweep        Sweep driver and readout correction");
    println!("  landau-adapter-sim  Local statevector backend");
    #[cfg(feature = "ibm")]
    println!("  landau-adapter-ibm  IBM Quantum backend");
    println!("  landau-cli          Command-line interface");
    println!();
    println!("License: {}", style("Apache-2.0").dim());
}
