//! Backends command implementation.

use anyhow::Result;
use console::style;

use landau_adapter_sim::SimulatorBackend;
use landau_hal::Backend;

#[cfg(feature = "ibm")]
use landau_adapter_ibm::{DEFAULT_BACKEND, IbmBackend};

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    println!("{} Available backends:\n", style("Landau").cyan().bold());

    let sim = SimulatorBackend::new();
    let available = sim.availability().await?.is_available;
    print_backend(&sim, available);

    #[cfg(feature = "ibm")]
    {
        match IbmBackend::connect(DEFAULT_BACKEND).await {
            Ok(ibm) => {
                let available = ibm.availability().await.is_ok_and(|a| a.is_available);
                print_backend(&ibm, available);
                match ibm.list_backends().await {
                    Ok(devices) if !devices.is_empty() => {
                        println!("    Devices: {}", devices.join(", "));
                    }
                    Ok(_) => {}
                    Err(e) => println!("    Devices: {}", style(format!("unavailable ({e})")).dim()),
                }
                if !available {
                    println!("    Status: offline or maintenance");
                }
            }
            Err(_) => {
                println!(
                    "  {} {} (not configured)",
                    style("○").dim(),
                    style("ibm").dim()
                );
                println!("    Set IBM_API_KEY + IBM_SERVICE_CRN (or IBM_QUANTUM_TOKEN) to enable");
            }
        }
        println!();
    }

    #[cfg(not(feature = "ibm"))]
    {
        println!(
            "  {} {} (not compiled)",
            style("○").dim(),
            style("ibm").dim()
        );
        println!("    Rebuild with --features ibm to enable");
        println!();
    }

    Ok(())
}

fn print_backend(backend: &dyn Backend, available: bool) {
    let caps = backend.capabilities();
    println!(
        "  {} {} {}",
        if available {
            style("●").green()
        } else {
            style("○").yellow()
        },
        style(backend.name()).bold(),
        if caps.is_simulator { "(simulator)" } else { "(hardware)" }
    );
    println!("    Qubits: {}", caps.num_qubits);
    println!("    Max shots: {}", caps.max_shots);
    println!("    Gates: {}", caps.gate_set.single_qubit.join(", "));
    if !caps.features.is_empty() {
        println!("    Features: {}", caps.features.join(", "));
    }
}
