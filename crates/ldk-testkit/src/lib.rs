//! ldk-testkit
//!
//! Fixtures shared by scenario and CLI tests: raw-record builders, a broker
//! tradebook CSV writer (complete with the metadata preamble real exports
//! carry), and temp-dir plumbing.  Test support only — nothing here belongs
//! in a production dependency graph.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ldk_schemas::RawTradeRecord;

/// Shorthand for a BUY row.
pub fn buy(instrument: &str, date: &str, quantity: u64, price: &str) -> RawTradeRecord {
    RawTradeRecord::new(instrument, "buy", quantity.to_string(), price, date)
}

/// Shorthand for a SELL row.
pub fn sell(instrument: &str, date: &str, quantity: u64, price: &str) -> RawTradeRecord {
    RawTradeRecord::new(instrument, "sell", quantity.to_string(), price, date)
}

/// A tradebook CSV fixture in the broker-export shape the CLI ingests:
/// `preamble_lines` of metadata, then a header row
/// `Symbol,Trade Date,Trade Type,Quantity,Price`, then data rows.
pub struct TradebookFixture {
    dir: TempDir,
}

impl TradebookFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new().context("create fixture tempdir")?,
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Write `records` as `<name>` under the fixture dir and return the path.
    pub fn write_tradebook(
        &self,
        name: &str,
        preamble_lines: usize,
        records: &[RawTradeRecord],
    ) -> Result<PathBuf> {
        let path = self.dir.path().join(name);

        let mut out = String::new();
        for i in 0..preamble_lines {
            // Real exports put account metadata here; content is irrelevant,
            // only that the ingester skips it.
            out.push_str(&format!("Broker Statement,Meta Row {i},,,\n"));
        }

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record(["Symbol", "Trade Date", "Trade Type", "Quantity", "Price"])?;
        for r in records {
            wtr.write_record([
                r.instrument.as_str(),
                r.timestamp.as_str(),
                r.trade_type.as_str(),
                r.quantity.as_str(),
                r.price.as_str(),
            ])?;
        }
        let body = wtr.into_inner().context("flush csv writer")?;
        out.push_str(&String::from_utf8(body).context("csv fixture is utf-8")?);

        fs::write(&path, out).with_context(|| format!("write fixture {}", path.display()))?;
        Ok(path)
    }

    /// Write a desk config YAML under the fixture dir and return the path.
    pub fn write_config(&self, name: &str, yaml: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        fs::write(&path, yaml).with_context(|| format!("write config {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tradebook_fixture_has_preamble_header_and_rows() {
        let fx = TradebookFixture::new().unwrap();
        let path = fx
            .write_tradebook("tb.csv", 2, &[buy("TCS", "2024-04-01", 10, "3200")])
            .unwrap();
        let text = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Broker Statement"));
        assert_eq!(lines[2], "Symbol,Trade Date,Trade Type,Quantity,Price");
        assert_eq!(lines[3], "TCS,2024-04-01,buy,10,3200");
    }
}
