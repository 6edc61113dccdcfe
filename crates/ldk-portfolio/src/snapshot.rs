use std::collections::BTreeMap;

use ldk_ledger::TradeLedger;
use ldk_schemas::Money;
use serde::Serialize;

use crate::book::{BookError, LotBook};

/// One row of the portfolio snapshot, shaped for a presentation layer.
///
/// `average_cost` is `None` for a flat instrument ("not held") — the
/// undefined average is reported as absence, never as zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HoldingRow {
    pub instrument: String,
    pub quantity: u64,
    pub average_cost: Option<Money>,
}

/// All lot books for one normalized ledger, built in a single pass.
///
/// Books for different instruments are mutually independent; this container
/// only groups them for querying and reporting.  Like the books themselves
/// it is rebuilt per session, never updated in place.
#[derive(Clone, Debug)]
pub struct Portfolio {
    books: BTreeMap<String, LotBook>,
}

impl Portfolio {
    /// Replay every instrument in the ledger.
    ///
    /// # Errors
    /// Batch-fatal: the first [`BookError::Oversell`] aborts the whole
    /// build, so a portfolio with silently-negative holdings can never be
    /// observed.
    pub fn from_ledger(ledger: &TradeLedger) -> Result<Self, BookError> {
        let mut books = BTreeMap::new();
        for (instrument, trades) in ledger.iter() {
            let book = LotBook::replay(instrument, trades)?;
            books.insert(instrument.to_string(), book);
        }
        Ok(Portfolio { books })
    }

    /// The lot book for one instrument, if the ledger contained it.
    pub fn book(&self, instrument: &str) -> Option<&LotBook> {
        self.books.get(instrument)
    }

    /// All books in instrument order (including flat ones).
    pub fn books(&self) -> impl Iterator<Item = &LotBook> {
        self.books.values()
    }

    /// The active portfolio: one row per instrument that currently holds
    /// shares, ordered by instrument identifier.
    ///
    /// Instruments whose book went flat are omitted — they show up again on
    /// the first re-buy, because every session rebuilds from the ledger.
    pub fn snapshot(&self) -> Vec<HoldingRow> {
        self.books
            .values()
            .filter(|b| !b.is_flat())
            .map(|b| HoldingRow {
                instrument: b.instrument().to_string(),
                quantity: b.current_quantity(),
                average_cost: b.average_cost().ok(),
            })
            .collect()
    }
}
