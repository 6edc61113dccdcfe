//! ldk entry point.
//!
//! This file is intentionally thin: it sets up tracing, parses the command
//! line, and dispatches.  All command logic lives in `commands/`; the
//! tradebook CSV mapping lives in `tradebook.rs`.

mod commands;
mod tradebook;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ldk")]
#[command(about = "LotDesk — FIFO cost basis and target sell pricing", long_about = None)]
struct Cli {
    /// Desk config YAML; repeatable, later files override earlier ones.
    #[arg(long = "config", global = true)]
    config: Vec<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

/// Input options shared by every command.
#[derive(Args)]
struct InputArgs {
    /// Broker tradebook CSV export; repeatable, concatenated in order.
    #[arg(long = "tradebook", required = true)]
    tradebooks: Vec<PathBuf>,

    /// Metadata lines to skip before the header row (broker statements
    /// commonly carry an account preamble).
    #[arg(long, default_value_t = 0)]
    skip_rows: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the active portfolio (holdings and average buy price)
    Portfolio {
        #[command(flatten)]
        input: InputArgs,

        /// Emit machine-readable JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Compute the per-share price needed to hit a profit target
    Price {
        #[command(flatten)]
        input: InputArgs,

        /// Instrument to price (aliases from the config apply)
        #[arg(long)]
        instrument: String,

        /// Number of shares in the hypothetical sale
        #[arg(long)]
        quantity: u64,

        /// Desired profit percentage, e.g. 10 or 7.5; negative = at a loss
        #[arg(long, allow_hyphen_values = true)]
        profit: String,

        /// Acknowledge a negative profit target (pricing below cost)
        #[arg(long, default_value_t = false)]
        allow_loss: bool,

        /// Emit machine-readable JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Summarize the normalized trade ledger per instrument
    Ledger {
        #[command(flatten)]
        input: InputArgs,

        /// Emit machine-readable JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Portfolio { input, json } => {
            let inputs = commands::load_inputs(&cli.config, &input.tradebooks, input.skip_rows)?;
            commands::portfolio::run(&inputs, json)
        }
        Commands::Price {
            input,
            instrument,
            quantity,
            profit,
            allow_loss,
            json,
        } => {
            let inputs = commands::load_inputs(&cli.config, &input.tradebooks, input.skip_rows)?;
            commands::price::run(&inputs, &instrument, quantity, &profit, allow_loss, json)
        }
        Commands::Ledger { input, json } => {
            let inputs = commands::load_inputs(&cli.config, &input.tradebooks, input.skip_rows)?;
            commands::ledger::run(&inputs, json)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
