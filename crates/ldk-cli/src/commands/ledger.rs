use anyhow::Result;
use serde_json::json;

use ldk_schemas::Side;

use super::LoadedInputs;

/// Per-instrument summary of the normalized ledger: trade counts, net
/// quantity, and the covered date range.  Useful for eyeballing whether a
/// set of tradebook exports is complete before trusting the portfolio.
pub fn run(inputs: &LoadedInputs, json_out: bool) -> Result<()> {
    let mut rows = Vec::new();
    for (instrument, trades) in inputs.ledger.iter() {
        let buys: u64 = trades
            .iter()
            .filter(|t| t.side == Side::Buy)
            .map(|t| t.quantity)
            .sum();
        let sells: u64 = trades
            .iter()
            .filter(|t| t.side == Side::Sell)
            .map(|t| t.quantity)
            .sum();
        let first = trades.first().map(|t| t.timestamp.date().to_string());
        let last = trades.last().map(|t| t.timestamp.date().to_string());
        rows.push((instrument, trades.len(), buys, sells, first, last));
    }

    if json_out {
        let value: Vec<_> = rows
            .iter()
            .map(|(instrument, trades, buys, sells, first, last)| {
                json!({
                    "instrument": instrument,
                    "trades": trades,
                    "bought": buys,
                    "sold": sells,
                    "net_quantity": *buys as i64 - *sells as i64,
                    "first_trade": first,
                    "last_trade": last,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("Ledger is empty.");
        return Ok(());
    }

    println!(
        "{:<12}  {:>7}  {:>10}  {:>10}  {:>10}  {:<10}  {:<10}",
        "Instrument", "Trades", "Bought", "Sold", "Net", "First", "Last"
    );
    for (instrument, trades, buys, sells, first, last) in rows {
        println!(
            "{:<12}  {:>7}  {:>10}  {:>10}  {:>10}  {:<10}  {:<10}",
            instrument,
            trades,
            buys,
            sells,
            buys as i64 - sells as i64,
            first.unwrap_or_default(),
            last.unwrap_or_default()
        );
    }
    Ok(())
}
