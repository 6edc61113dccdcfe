use anyhow::Result;

use ldk_portfolio::Portfolio;

use super::LoadedInputs;

/// Print the active portfolio as a table (or JSON rows).
pub fn run(inputs: &LoadedInputs, json: bool) -> Result<()> {
    let pf = Portfolio::from_ledger(&inputs.ledger)?;
    let rows = pf.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No active holdings.");
        return Ok(());
    }

    let symbol = &inputs.config.config.currency_symbol;
    let name_width = rows
        .iter()
        .map(|r| r.instrument.len())
        .max()
        .unwrap_or(0)
        .max("Instrument".len());

    println!(
        "{:<name_width$}  {:>10}  {:>18}",
        "Instrument", "Quantity", "Avg Buy Price"
    );
    for row in &rows {
        let avg = match &row.average_cost {
            Some(cost) => format!("{symbol}{cost}"),
            None => "-".to_string(),
        };
        println!(
            "{:<name_width$}  {:>10}  {:>18}",
            row.instrument, row.quantity, avg
        );
    }
    Ok(())
}
