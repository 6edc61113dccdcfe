//! ldk-ledger
//!
//! Trade Ledger Normalizer: turns loosely-typed trade rows from any host into
//! a canonical, per-instrument, chronologically ordered [`TradeLedger`].
//!
//! Determinism is the whole point.  FIFO consumption downstream depends on
//! the exact trade order, so:
//! - parsing is all-or-nothing — one bad row aborts the whole batch
//!   ([`NormalizeError::InvalidRecord`]), a partially-loaded ledger would
//!   silently corrupt lot ordering;
//! - ordering is total — (instrument, timestamp, arrival ordinal), so
//!   same-timestamp trades keep their input order on every run.
//!
//! Pure transformation: no IO, no logging, no global state.  The alias table
//! and suppression set arrive as explicit parameters.

mod normalize;

pub use normalize::{normalize, NormalizeError, RecordField, TradeLedger};
