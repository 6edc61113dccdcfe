//! Command handler modules for ldk.
//!
//! Shared loading pipeline lives here; command-specific logic lives in the
//! submodules.

pub mod ledger;
pub mod portfolio;
pub mod price;

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use ldk_config::{load_layered_yaml, LoadedConfig};
use ldk_ledger::TradeLedger;

use crate::tradebook;

/// Everything a command needs: the layered config and the normalized ledger.
pub struct LoadedInputs {
    pub config: LoadedConfig,
    pub ledger: TradeLedger,
}

/// Load config, ingest the tradebooks, and normalize.
///
/// The config hash is logged so a report can be tied to the exact
/// configuration that produced it.
pub fn load_inputs(
    config_paths: &[PathBuf],
    tradebooks: &[PathBuf],
    skip_rows: usize,
) -> Result<LoadedInputs> {
    let config = load_layered_yaml(config_paths).context("loading desk config")?;
    info!(config_hash = %config.config_hash, "desk config loaded");

    let mut sequences = Vec::with_capacity(tradebooks.len());
    for path in tradebooks {
        let rows = tradebook::load_tradebook_csv(path, skip_rows)?;
        info!(tradebook = %path.display(), rows = rows.len(), "tradebook ingested");
        sequences.push(rows);
    }

    let ledger = ldk_ledger::normalize(
        &sequences,
        &config.config.aliases,
        &config.config.suppressed,
    )
    .context("normalizing trade ledger")?;
    info!(
        instruments = ledger.instrument_count(),
        trades = ledger.trade_count(),
        "ledger normalized"
    );

    Ok(LoadedInputs { config, ledger })
}

/// Canonicalize a user-supplied instrument name the same way ingestion does.
pub fn canonical_instrument<'a>(inputs: &'a LoadedInputs, raw: &'a str) -> &'a str {
    let trimmed = raw.trim();
    inputs
        .config
        .config
        .aliases
        .get(trimmed)
        .map(String::as_str)
        .unwrap_or(trimmed)
}
