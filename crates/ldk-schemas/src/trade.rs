use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::money::Money;

/// BUY or SELL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a trade-type string is neither BUY nor SELL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSideError {
    pub raw: String,
}

impl std::fmt::Display for ParseSideError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' is not a trade side (expected BUY or SELL)", self.raw)
    }
}

impl std::error::Error for ParseSideError {}

impl FromStr for Side {
    type Err = ParseSideError;

    /// Case-insensitive match against exactly BUY or SELL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("buy") {
            Ok(Side::Buy)
        } else if t.eq_ignore_ascii_case("sell") {
            Ok(Side::Sell)
        } else {
            Err(ParseSideError { raw: s.to_string() })
        }
    }
}

/// A loosely-typed trade row as delivered by a host application.
///
/// All fields are strings; the ledger normalizer owns validation.  Hosts map
/// whatever they ingest (CSV export, pasted text, API payload) onto this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTradeRecord {
    pub instrument: String,
    pub trade_type: String,
    pub quantity: String,
    pub price: String,
    pub timestamp: String,
}

impl RawTradeRecord {
    pub fn new(
        instrument: impl Into<String>,
        trade_type: impl Into<String>,
        quantity: impl Into<String>,
        price: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            instrument: instrument.into(),
            trade_type: trade_type.into(),
            quantity: quantity.into(),
            price: price.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// A validated, immutable trade record.
///
/// Created once by the normalizer and never mutated afterwards.  `timestamp`
/// is naive — it exists only to order trades within one instrument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub instrument: String,
    pub timestamp: NaiveDateTime,
    pub side: Side,
    pub quantity: u64,
    pub price: Money,
}
