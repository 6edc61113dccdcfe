use anyhow::{bail, Context, Result};

use ldk_portfolio::Portfolio;
use ldk_pricing::{quote_for_book, ProfitBps};

use super::{canonical_instrument, LoadedInputs};

/// Compute and print the target selling price for one instrument.
pub fn run(
    inputs: &LoadedInputs,
    instrument: &str,
    quantity: u64,
    profit: &str,
    allow_loss: bool,
    json: bool,
) -> Result<()> {
    let profit: ProfitBps = profit
        .parse()
        .with_context(|| format!("invalid --profit '{profit}'"))?;
    if profit.is_loss() && !allow_loss {
        bail!("profit target {profit} prices below cost; pass --allow-loss to confirm");
    }

    let name = canonical_instrument(inputs, instrument);
    let pf = Portfolio::from_ledger(&inputs.ledger)?;
    let book = pf
        .book(name)
        .with_context(|| format!("no trades recorded for '{name}'"))?;

    let quote = quote_for_book(book, quantity, profit)
        .with_context(|| format!("pricing {quantity} share(s) of {name}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
        return Ok(());
    }

    let symbol = &inputs.config.config.currency_symbol;
    println!(
        "Sell {} share(s) of {} at {symbol}{} per share for {} profit.",
        quote.quantity, quote.instrument, quote.price_per_share, quote.profit
    );
    println!(
        "  cost basis {symbol}{}  →  proceeds {symbol}{}",
        quote.cost_basis, quote.total_proceeds
    );
    Ok(())
}
