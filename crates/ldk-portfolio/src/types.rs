use chrono::NaiveDateTime;
use ldk_schemas::Money;
use serde::Serialize;

/// A block of shares bought together at one price.
///
/// Owned exclusively by its [`LotBook`](crate::LotBook): `unit_cost` and
/// `origin_timestamp` are fixed at creation, `remaining_quantity` only ever
/// decreases as sells consume the lot.  A lot that reaches zero is retired
/// from the queue; its history is not retained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Lot {
    pub remaining_quantity: u64,
    pub unit_cost: Money,
    pub origin_timestamp: NaiveDateTime,
}

impl Lot {
    /// This lot's share of the cost basis, in micros (i128 so whole-book
    /// sums never overflow).
    pub fn cost_micros(&self) -> i128 {
        (self.unit_cost.micros() as i128) * (self.remaining_quantity as i128)
    }
}

/// A by-value view of one active lot, oldest-first in iteration order.
///
/// Deliberately detached from the book: holding a `LotView` cannot observe
/// or block later mutation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LotView {
    pub remaining_quantity: u64,
    pub unit_cost: Money,
}
