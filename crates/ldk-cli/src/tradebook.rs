//! Tradebook CSV mapping.
//!
//! Broker tradebook exports are the one input format this host understands:
//! a metadata preamble (account details, statement period), then a header
//! row, then one trade per line.  The columns of interest are `Symbol`,
//! `Trade Date`, `Trade Type`, `Quantity`, `Price`; anything else in the
//! file is ignored.  This module only maps rows onto [`RawTradeRecord`] —
//! all validation belongs to the normalizer.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use ldk_schemas::RawTradeRecord;

const COL_SYMBOL: &str = "Symbol";
const COL_DATE: &str = "Trade Date";
const COL_TYPE: &str = "Trade Type";
const COL_QUANTITY: &str = "Quantity";
const COL_PRICE: &str = "Price";

/// Read one tradebook CSV, skipping `skip_rows` physical lines of preamble
/// before the header row.
pub fn load_tradebook_csv(path: &Path, skip_rows: usize) -> Result<Vec<RawTradeRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read tradebook: {}", path.display()))?;

    let mut lines = text.lines();
    for _ in 0..skip_rows {
        if lines.next().is_none() {
            bail!(
                "{}: file ends inside the {skip_rows}-line preamble",
                path.display()
            );
        }
    }
    let body: String = lines.collect::<Vec<_>>().join("\n");

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = rdr
        .headers()
        .with_context(|| format!("{}: missing header row", path.display()))?
        .clone();
    let col = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .with_context(|| {
                format!(
                    "{}: column '{name}' not found in header (is --skip-rows right?)",
                    path.display()
                )
            })
    };
    let idx_symbol = col(COL_SYMBOL)?;
    let idx_date = col(COL_DATE)?;
    let idx_type = col(COL_TYPE)?;
    let idx_quantity = col(COL_QUANTITY)?;
    let idx_price = col(COL_PRICE)?;

    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("{}: malformed csv row {i}", path.display()))?;
        let cell = |idx: usize, name: &str| -> Result<&str> {
            rec.get(idx)
                .with_context(|| format!("{}: row {i} is missing '{name}'", path.display()))
        };
        out.push(RawTradeRecord::new(
            cell(idx_symbol, COL_SYMBOL)?,
            cell(idx_type, COL_TYPE)?,
            cell(idx_quantity, COL_QUANTITY)?,
            cell(idx_price, COL_PRICE)?,
            cell(idx_date, COL_DATE)?,
        ));
    }
    Ok(out)
}
