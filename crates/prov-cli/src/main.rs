//! # prov CLI entry point
//!
//! Parses arguments, resolves configuration, and dispatches to the
//! subcommand handlers. Logs go to stderr so stdout stays JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use prov_cli::asset::{run_asset, AssetArgs};
use prov_cli::config::CliConfig;
use prov_cli::invoke::{run_events, run_invoke, run_policy, EventsArgs, InvokeArgs, PolicyArgs};
use prov_cli::product::{run_product, ProductArgs};
use prov_cli::session::Session;

/// Provenance ledger CLI.
///
/// Runs asset lifecycle and product custody operations against a
/// file-backed ledger snapshot.
#[derive(Parser, Debug)]
#[command(name = "prov", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to a YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Ledger snapshot file (overrides config and PROV_LEDGER).
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    /// Caller organization (overrides config and PROV_MSP_ID).
    #[arg(long, global = true)]
    msp_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Asset lifecycle operations.
    Asset(AssetArgs),

    /// Product custody operations.
    Product(ProductArgs),

    /// Call a contract function by name.
    Invoke(InvokeArgs),

    /// Show committed events.
    Events(EventsArgs),

    /// Show the endorsement policy declared on a key.
    Policy(PolicyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    let logs = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        logs.json().init();
    } else {
        logs.init();
    }

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(ledger) = cli.ledger {
        config.ledger_path = ledger;
    }
    if let Some(msp_id) = cli.msp_id {
        config.msp_id = msp_id;
    }

    let session = Session::open(&config)?;
    tracing::debug!(
        ledger = %session.ledger_path().display(),
        msp_id = %config.msp_id,
        "session opened"
    );

    match cli.command {
        Commands::Asset(args) => run_asset(&args, &session),
        Commands::Product(args) => run_product(&args, &session),
        Commands::Invoke(args) => run_invoke(&args, &session),
        Commands::Events(args) => run_events(&args, &session),
        Commands::Policy(args) => run_policy(&args, &session),
    }
}
