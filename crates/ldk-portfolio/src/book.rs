use chrono::NaiveDateTime;
use std::collections::VecDeque;

use ldk_schemas::{Money, Side, Trade};

use crate::types::{Lot, LotView};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Lot-book failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    /// A sell consumed more shares than all recorded prior buys.  Signals a
    /// data-completeness problem (missing history); construction halts, the
    /// book never goes negative.
    Oversell {
        instrument: String,
        /// Shares the sell still needed after the queue emptied.
        shortfall: u64,
        /// Timestamp of the offending sell trade.
        at: NaiveDateTime,
    },
    /// A cost-basis query against a book with zero net quantity.
    NoHolding { instrument: String },
}

impl std::fmt::Display for BookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oversell {
                instrument,
                shortfall,
                at,
            } => write!(
                f,
                "oversell on {instrument}: sell at {at} exceeds recorded buys by {shortfall} share(s)"
            ),
            Self::NoHolding { instrument } => {
                write!(f, "no holding in {instrument}")
            }
        }
    }
}

impl std::error::Error for BookError {}

// ---------------------------------------------------------------------------
// LotBook
// ---------------------------------------------------------------------------

/// Per-instrument FIFO queue of open purchase lots.
///
/// Built by replaying the instrument's canonical trade sequence (ascending
/// timestamp, stable ties — the normalizer's output order).  After
/// construction the book is read-only; a new session rebuilds from scratch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LotBook {
    instrument: String,
    lots: VecDeque<Lot>,
}

impl LotBook {
    /// Replay one instrument's ordered trades into a lot book.
    ///
    /// BUY appends a lot at the tail; SELL consumes from the head, retiring
    /// lots that reach zero.  The replay is a strict sequential fold — each
    /// trade's effect depends on the exact queue state before it.
    ///
    /// # Errors
    /// [`BookError::Oversell`] if any sell exhausts the queue; no partial
    /// book escapes.
    pub fn replay(instrument: impl Into<String>, trades: &[Trade]) -> Result<Self, BookError> {
        let mut book = LotBook {
            instrument: instrument.into(),
            lots: VecDeque::new(),
        };
        for trade in trades {
            match trade.side {
                Side::Buy => book.open_lot(trade),
                Side::Sell => book.consume(trade.quantity, trade.timestamp)?,
            }
        }
        Ok(book)
    }

    fn open_lot(&mut self, trade: &Trade) {
        debug_assert!(trade.quantity > 0, "normalizer guarantees positive quantity");
        self.lots.push_back(Lot {
            remaining_quantity: trade.quantity,
            unit_cost: trade.price,
            origin_timestamp: trade.timestamp,
        });
    }

    /// Consume `quantity` shares oldest-first.
    fn consume(&mut self, quantity: u64, at: NaiveDateTime) -> Result<(), BookError> {
        let mut to_consume = quantity;
        while to_consume > 0 {
            let Some(head) = self.lots.front_mut() else {
                return Err(BookError::Oversell {
                    instrument: self.instrument.clone(),
                    shortfall: to_consume,
                    at,
                });
            };
            let taken = head.remaining_quantity.min(to_consume);
            head.remaining_quantity -= taken;
            to_consume -= taken;
            if head.remaining_quantity == 0 {
                self.lots.pop_front();
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    /// Net holding: sum of the active lots' remaining quantities.
    pub fn current_quantity(&self) -> u64 {
        self.lots.iter().map(|l| l.remaining_quantity).sum()
    }

    /// `true` if no shares are held.
    pub fn is_flat(&self) -> bool {
        self.lots.is_empty()
    }

    /// Weighted average cost of the current holding, rounded to the minor
    /// unit.
    ///
    /// # Errors
    /// [`BookError::NoHolding`] when the book is flat — an average over zero
    /// shares is undefined, not zero.
    pub fn average_cost(&self) -> Result<Money, BookError> {
        let quantity = self.current_quantity();
        if quantity == 0 {
            return Err(BookError::NoHolding {
                instrument: self.instrument.clone(),
            });
        }
        let total: i128 = self.lots.iter().map(Lot::cost_micros).sum();
        Ok(Money::per_unit_rounded(total, quantity))
    }

    /// The active lots oldest-first, by value.
    ///
    /// Lazy, finite, restartable: call it as often as needed; each call
    /// yields an independent pass over the same snapshot and cannot observe
    /// or cause mutation.
    pub fn active_lots(&self) -> impl Iterator<Item = LotView> + '_ {
        self.lots.iter().map(|l| LotView {
            remaining_quantity: l.remaining_quantity,
            unit_cost: l.unit_cost,
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
