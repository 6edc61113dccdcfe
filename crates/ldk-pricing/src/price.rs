use serde::Serialize;

use ldk_portfolio::{LotBook, LotView};
use ldk_schemas::Money;

use crate::profit::ProfitBps;

const BPS_PER_WHOLE: i128 = 10_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Pricing failures.  Per-call and recoverable: they never invalidate the
/// book being queried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Asked to price a sale of zero shares.
    ZeroQuantity,
    /// The query wants more shares than the lots hold.  `available` is the
    /// full current quantity, so a caller can retry with a smaller ask.
    InsufficientShares { requested: u64, available: u64 },
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroQuantity => write!(f, "quantity to sell must be greater than zero"),
            Self::InsufficientShares {
                requested,
                available,
            } => write!(
                f,
                "not enough shares: requested {requested}, holding {available}"
            ),
        }
    }
}

impl std::error::Error for PricingError {}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Minimum per-share price to realize `profit` on `quantity_to_sell` shares,
/// costed against `lots` oldest-first (the lot book's exposure order).
///
/// `target_proceeds = fifo_cost × (1 + profit)`; the per-share price is
/// `target_proceeds / quantity_to_sell` rounded to the minor unit.  A
/// negative `profit` prices below cost and is accepted — the break-even and
/// loss cases share one formula.
///
/// Pure: consumes only a by-value lot iterator, mutates nothing.
///
/// # Errors
/// [`PricingError::ZeroQuantity`] for a zero ask;
/// [`PricingError::InsufficientShares`] when the lots run out first.
pub fn required_selling_price(
    lots: impl IntoIterator<Item = LotView>,
    quantity_to_sell: u64,
    profit: ProfitBps,
) -> Result<Money, PricingError> {
    if quantity_to_sell == 0 {
        return Err(PricingError::ZeroQuantity);
    }

    // Walk oldest-first, accumulating the cost of exactly the shares this
    // hypothetical sale would consume.
    let mut still_needed = quantity_to_sell;
    let mut covered_cost_micros: i128 = 0;
    let mut available: u64 = 0;

    for lot in lots {
        available += lot.remaining_quantity;
        if still_needed == 0 {
            continue; // keep summing availability for the error path only
        }
        let taken = lot.remaining_quantity.min(still_needed);
        covered_cost_micros += (lot.unit_cost.micros() as i128) * (taken as i128);
        still_needed -= taken;
    }

    if still_needed > 0 {
        return Err(PricingError::InsufficientShares {
            requested: quantity_to_sell,
            available,
        });
    }

    let target_proceeds_micros =
        covered_cost_micros * (BPS_PER_WHOLE + profit.bps() as i128) / BPS_PER_WHOLE;
    Ok(Money::per_unit_rounded(
        target_proceeds_micros,
        quantity_to_sell,
    ))
}

/// A fully-resolved price query, shaped for a presentation layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    pub instrument: String,
    pub quantity: u64,
    pub profit: ProfitBps,
    /// FIFO cost of the shares the sale would consume, minor-unit rounded.
    pub cost_basis: Money,
    /// Proceeds at exactly `price_per_share × quantity`.
    pub total_proceeds: Money,
    pub price_per_share: Money,
}

/// Price a hypothetical sale against a built lot book.
///
/// Convenience wrapper over [`required_selling_price`] that also reports the
/// covered cost basis and the proceeds at the quoted price.
pub fn quote_for_book(
    book: &LotBook,
    quantity_to_sell: u64,
    profit: ProfitBps,
) -> Result<PriceQuote, PricingError> {
    let price_per_share = required_selling_price(book.active_lots(), quantity_to_sell, profit)?;

    let mut still_needed = quantity_to_sell;
    let mut covered_cost_micros: i128 = 0;
    for lot in book.active_lots() {
        if still_needed == 0 {
            break;
        }
        let taken = lot.remaining_quantity.min(still_needed);
        covered_cost_micros += (lot.unit_cost.micros() as i128) * (taken as i128);
        still_needed -= taken;
    }

    let total_proceeds = price_per_share
        .checked_mul_qty(quantity_to_sell)
        .unwrap_or(Money::from_micros(i64::MAX));

    Ok(PriceQuote {
        instrument: book.instrument().to_string(),
        quantity: quantity_to_sell,
        profit,
        cost_basis: Money::per_unit_rounded(covered_cost_micros, 1),
        total_proceeds,
        price_per_share,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lot(quantity: u64, unit_cost: &str) -> LotView {
        LotView {
            remaining_quantity: quantity,
            unit_cost: unit_cost.parse().unwrap(),
        }
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn pct(s: &str) -> ProfitBps {
        s.parse().unwrap()
    }

    #[test]
    fn prices_the_reference_scenario() {
        // buys (10@100), (5@120); sell 12 at 10% profit:
        // cost = 10×100 + 2×120 = 1240; proceeds = 1364; 1364/12 = 113.67
        let lots = [lot(10, "100"), lot(5, "120")];
        let price = required_selling_price(lots, 12, pct("10")).unwrap();
        assert_eq!(price, money("113.67"));
    }

    #[test]
    fn break_even_reproduces_average_cost() {
        let lots = [lot(10, "100"), lot(5, "120")];
        // avg over all 15 = 1600/15 = 106.666... → 106.67
        let price = required_selling_price(lots, 15, ProfitBps::BREAK_EVEN).unwrap();
        assert_eq!(price, money("106.67"));
    }

    #[test]
    fn only_the_consumed_lots_enter_the_cost() {
        // Selling 5 out of [5@10, 5@20] touches only the first lot.
        let lots = [lot(5, "10"), lot(5, "20")];
        let price = required_selling_price(lots, 5, ProfitBps::BREAK_EVEN).unwrap();
        assert_eq!(price, money("10.00"));
    }

    #[test]
    fn negative_profit_prices_below_cost() {
        let lots = [lot(10, "100")];
        let price = required_selling_price(lots, 10, pct("-10")).unwrap();
        assert_eq!(price, money("90.00"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let lots = [lot(10, "100")];
        assert_eq!(
            required_selling_price(lots, 0, ProfitBps::BREAK_EVEN),
            Err(PricingError::ZeroQuantity)
        );
    }

    #[test]
    fn exhausted_lots_report_requested_vs_available() {
        let lots = [lot(10, "100"), lot(5, "120")];
        assert_eq!(
            required_selling_price(lots, 16, pct("10")),
            Err(PricingError::InsufficientShares {
                requested: 16,
                available: 15
            })
        );
    }

    #[test]
    fn empty_lots_have_zero_available() {
        assert_eq!(
            required_selling_price([], 1, ProfitBps::BREAK_EVEN),
            Err(PricingError::InsufficientShares {
                requested: 1,
                available: 0
            })
        );
    }

    #[test]
    fn selling_exactly_everything_succeeds() {
        let lots = [lot(10, "100"), lot(5, "120")];
        assert!(required_selling_price(lots, 15, pct("5")).is_ok());
    }

    #[test]
    fn fractional_percent_targets_work() {
        // cost 1000; +2.5% = 1025; /10 = 102.50
        let lots = [lot(10, "100")];
        let price = required_selling_price(lots, 10, pct("2.5")).unwrap();
        assert_eq!(price, money("102.50"));
    }

    #[test]
    fn repeated_queries_are_identical() {
        let lots = [lot(10, "100"), lot(5, "120")];
        let a = required_selling_price(lots, 12, pct("10"));
        let b = required_selling_price(lots, 12, pct("10"));
        assert_eq!(a, b);
    }
}
