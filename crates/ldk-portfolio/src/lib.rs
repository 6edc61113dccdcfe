//! ldk-portfolio
//!
//! FIFO Lot Book and portfolio snapshot.
//! - Lot-driven holding state: buys open lots, sells consume them oldest-first
//! - Oversell detection (a sell may never exceed recorded prior buys)
//! - Weighted-average cost basis over the remaining lots
//! - Pure deterministic logic (no IO, no time, no host wiring)
//!
//! A [`LotBook`] is rebuilt from its instrument's full trade sequence on
//! every session — construct once, read many.  There is no incremental
//! update across sessions; rebuilding is cheap and leaves no room for stale
//! derived state.

mod book;
mod snapshot;
mod types;

pub use book::{BookError, LotBook};
pub use snapshot::{HoldingRow, Portfolio};
pub use types::LotView;
