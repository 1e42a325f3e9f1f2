//! Landau command-line interface.
//!
//! ```text
//!   E
//!   │ ╲                   ╱
//!   │   ╲_______________╱      ← |1⟩ branch
//!   │       ╲       ╱
//!   │        )  Δ  (           avoided crossing at t = 0
//!   │   ____╱       ╲_____
//!   │  ╱                  ╲    ← |0⟩ branch
//!   └──────────────────────── t
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::{OutputFormat, SimOptions, SweepOverrides};
use commands::{backends, run, spectrum, version};

/// Landau - Landau-Zener sweeps on quantum hardware
#[derive(Parser)]
#[command(name = "landau")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a sweep and print raw, calibrated, and ideal probabilities
    Run {
        /// YAML sweep configuration
        #[arg(short, long)]
        config: Option<String>,

        /// Backend to use (simulator, ibm, or an IBM device name)
        #[arg(short, long, default_value = "simulator")]
        backend: String,

        #[command(flatten)]
        overrides: SweepOverrides,

        #[command(flatten)]
        sim: SimOptions,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show H(t), its spectrum, and the ground state at one time
    Spectrum {
        /// Time t
        #[arg(short, long, allow_hyphen_values = true)]
        time: f64,

        /// Annealing time τ
        #[arg(long, default_value = "1.0")]
        annealing_time: f64,

        /// Gap Δ
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        gap: f64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run {
            config,
            backend,
            overrides,
            sim,
            format,
        } => run::execute(config.as_deref(), &backend, &overrides, &sim, format).await,

        Commands::Spectrum {
            time,
            annealing_time,
            gap,
            format,
        } => spectrum::execute(time, annealing_time, gap, format),

        Commands::Backends => backends::execute().await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
