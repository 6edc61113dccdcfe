use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, BTreeSet};

use ldk_schemas::{Money, RawTradeRecord, Side, Trade};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Which field of a raw row failed to parse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecordField {
    Instrument,
    TradeType,
    Quantity,
    Price,
    Timestamp,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Instrument => "instrument",
            RecordField::TradeType => "trade_type",
            RecordField::Quantity => "quantity",
            RecordField::Price => "price",
            RecordField::Timestamp => "timestamp",
        }
    }
}

/// Normalization failures.  All are batch-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// A row could not be parsed.  Carries enough context to render an
    /// actionable message without re-reading the input.
    InvalidRecord {
        /// Index of the input sequence the row came from.
        sequence: usize,
        /// Zero-based row position within that sequence.
        row: usize,
        field: RecordField,
        /// The offending raw field value, verbatim.
        raw: String,
        reason: String,
    },
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecord {
                sequence,
                row,
                field,
                raw,
                reason,
            } => write!(
                f,
                "invalid record (sequence {sequence}, row {row}): bad {} '{raw}': {reason}",
                field.as_str()
            ),
        }
    }
}

impl std::error::Error for NormalizeError {}

// ---------------------------------------------------------------------------
// TradeLedger
// ---------------------------------------------------------------------------

/// Canonical per-instrument trade sequences, read-only after construction.
///
/// Within each instrument, trades are ordered by timestamp ascending with
/// arrival-order tie-break.  Instruments iterate in identifier order
/// (BTreeMap), so reports are deterministic too.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TradeLedger {
    instruments: BTreeMap<String, Vec<Trade>>,
}

impl TradeLedger {
    /// Number of instruments with at least one trade.
    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    /// Total trade count across all instruments.
    pub fn trade_count(&self) -> usize {
        self.instruments.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// The ordered trade sequence for one instrument, if present.
    pub fn trades(&self, instrument: &str) -> Option<&[Trade]> {
        self.instruments.get(instrument).map(Vec::as_slice)
    }

    /// Iterate (instrument, trades) in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Trade])> {
        self.instruments
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validate, order, and group raw trade rows into a [`TradeLedger`].
///
/// `sequences` are concatenated in order; each accepted row keeps a global
/// arrival ordinal used as the sort tie-break.  `aliases` coalesces raw
/// instrument identifiers into canonical ones before grouping.  `suppressed`
/// instruments are dropped from the result **only while** their net
/// historical quantity is zero or negative — an instrument bought again
/// after a full exit reappears on the next run.
///
/// # Errors
/// The first unparseable row aborts the whole batch with
/// [`NormalizeError::InvalidRecord`]; nothing partial is returned.
pub fn normalize(
    sequences: &[Vec<RawTradeRecord>],
    aliases: &BTreeMap<String, String>,
    suppressed: &BTreeSet<String>,
) -> Result<TradeLedger, NormalizeError> {
    // Parse everything first; any failure aborts before ordering starts.
    let mut parsed: Vec<Trade> = Vec::new();
    for (seq_idx, seq) in sequences.iter().enumerate() {
        for (row_idx, rec) in seq.iter().enumerate() {
            parsed.push(parse_record(seq_idx, row_idx, rec, aliases)?);
        }
    }

    // Stable sort on (instrument, timestamp): equal keys keep arrival order,
    // which is exactly the required tie-break.
    parsed.sort_by(|a, b| {
        (a.instrument.as_str(), a.timestamp).cmp(&(b.instrument.as_str(), b.timestamp))
    });

    let mut instruments: BTreeMap<String, Vec<Trade>> = BTreeMap::new();
    for trade in parsed {
        instruments
            .entry(trade.instrument.clone())
            .or_default()
            .push(trade);
    }

    // Suppression is evaluated fresh against this batch's net quantity.
    for name in suppressed {
        if let Some(trades) = instruments.get(name) {
            if net_quantity(trades) <= 0 {
                instruments.remove(name);
            }
        }
    }

    Ok(TradeLedger { instruments })
}

/// Net historical quantity (Σ buys − Σ sells), computed independently of the
/// lot book so suppression never depends on FIFO state.
fn net_quantity(trades: &[Trade]) -> i128 {
    trades
        .iter()
        .map(|t| match t.side {
            Side::Buy => t.quantity as i128,
            Side::Sell => -(t.quantity as i128),
        })
        .sum()
}

fn parse_record(
    sequence: usize,
    row: usize,
    rec: &RawTradeRecord,
    aliases: &BTreeMap<String, String>,
) -> Result<Trade, NormalizeError> {
    let fail = |field: RecordField, raw: &str, reason: String| NormalizeError::InvalidRecord {
        sequence,
        row,
        field,
        raw: raw.to_string(),
        reason,
    };

    let instrument = rec.instrument.trim();
    if instrument.is_empty() {
        return Err(fail(
            RecordField::Instrument,
            &rec.instrument,
            "instrument identifier is blank".to_string(),
        ));
    }
    let instrument = aliases
        .get(instrument)
        .map(String::as_str)
        .unwrap_or(instrument)
        .to_string();

    let side: Side = rec
        .trade_type
        .parse()
        .map_err(|e: ldk_schemas::ParseSideError| {
            fail(RecordField::TradeType, &rec.trade_type, e.to_string())
        })?;

    let quantity = parse_quantity(&rec.quantity)
        .map_err(|reason| fail(RecordField::Quantity, &rec.quantity, reason))?;

    let price: Money = rec
        .price
        .trim()
        .parse()
        .map_err(|e: ldk_schemas::ParseMoneyError| {
            fail(RecordField::Price, &rec.price, e.to_string())
        })?;
    if !price.is_positive() {
        return Err(fail(
            RecordField::Price,
            &rec.price,
            "price must be positive".to_string(),
        ));
    }

    let timestamp = parse_timestamp(&rec.timestamp)
        .ok_or_else(|| {
            fail(
                RecordField::Timestamp,
                &rec.timestamp,
                "not a recognized date or date-time".to_string(),
            )
        })?;

    Ok(Trade {
        instrument,
        timestamp,
        side,
        quantity,
        price,
    })
}

/// Parse a positive whole-share quantity.
///
/// Broker exports frequently stringify integers through float formatting
/// ("10.0"); a decimal point is accepted only when the fraction is all zeros.
fn parse_quantity(s: &str) -> Result<u64, String> {
    let t = s.trim();
    if t.is_empty() {
        return Err("quantity is blank".to_string());
    }

    let int_part = match t.split_once('.') {
        Some((int_part, frac)) => {
            if frac.is_empty() || !frac.bytes().all(|b| b == b'0') {
                return Err("quantity must be a whole number of shares".to_string());
            }
            int_part
        }
        None => t,
    };

    let qty: u64 = int_part
        .parse()
        .map_err(|_| "quantity must be a positive integer".to_string())?;
    if qty == 0 {
        return Err("quantity must be greater than zero".to_string());
    }
    Ok(qty)
}

/// Accepted timestamp shapes, tried in order.  A bare date means midnight —
/// ordering within a day then falls back to the arrival ordinal.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let t = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(t, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(instrument: &str, side: &str, qty: &str, price: &str, ts: &str) -> RawTradeRecord {
        RawTradeRecord::new(instrument, side, qty, price, ts)
    }

    fn no_aliases() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn no_suppression() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn accepts_a_clean_batch() {
        let rows = vec![vec![
            rec("TCS", "buy", "10", "3200.50", "2024-04-01"),
            rec("TCS", "SELL", "4", "3300", "2024-05-01"),
        ]];
        let ledger = normalize(&rows, &no_aliases(), &no_suppression()).unwrap();
        assert_eq!(ledger.instrument_count(), 1);
        let trades = ledger.trades("TCS").unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].side, Side::Buy);
        assert_eq!(trades[0].quantity, 10);
        assert_eq!(trades[1].side, Side::Sell);
    }

    #[test]
    fn one_bad_row_aborts_the_whole_batch() {
        let rows = vec![
            vec![rec("TCS", "buy", "10", "3200", "2024-04-01")],
            vec![
                rec("INFY", "buy", "5", "1500", "2024-04-02"),
                rec("INFY", "hold", "5", "1500", "2024-04-03"),
            ],
        ];
        let err = normalize(&rows, &no_aliases(), &no_suppression()).unwrap_err();
        let NormalizeError::InvalidRecord {
            sequence,
            row,
            field,
            raw,
            ..
        } = err;
        assert_eq!((sequence, row), (1, 1));
        assert_eq!(field, RecordField::TradeType);
        assert_eq!(raw, "hold");
    }

    #[test]
    fn rejects_each_malformed_field() {
        let cases = [
            (rec("  ", "buy", "1", "10", "2024-01-01"), RecordField::Instrument),
            (rec("A", "long", "1", "10", "2024-01-01"), RecordField::TradeType),
            (rec("A", "buy", "0", "10", "2024-01-01"), RecordField::Quantity),
            (rec("A", "buy", "1.5", "10", "2024-01-01"), RecordField::Quantity),
            (rec("A", "buy", "-3", "10", "2024-01-01"), RecordField::Quantity),
            (rec("A", "buy", "1", "0", "2024-01-01"), RecordField::Price),
            (rec("A", "buy", "1", "-10", "2024-01-01"), RecordField::Price),
            (rec("A", "buy", "1", "ten", "2024-01-01"), RecordField::Price),
            (rec("A", "buy", "1", "10", "01/04/2024"), RecordField::Timestamp),
        ];
        for (bad, field) in cases {
            let err = normalize(&[vec![bad]], &no_aliases(), &no_suppression()).unwrap_err();
            let NormalizeError::InvalidRecord { field: got, .. } = err;
            assert_eq!(got, field);
        }
    }

    #[test]
    fn float_formatted_whole_quantities_are_accepted() {
        let rows = vec![vec![rec("TCS", "buy", "10.0", "3200", "2024-04-01")]];
        let ledger = normalize(&rows, &no_aliases(), &no_suppression()).unwrap();
        assert_eq!(ledger.trades("TCS").unwrap()[0].quantity, 10);
    }

    #[test]
    fn date_time_and_bare_date_both_parse() {
        let rows = vec![vec![
            rec("A", "buy", "1", "10", "2024-04-01T10:30:00"),
            rec("A", "buy", "1", "10", "2024-04-01 11:30:00"),
            rec("A", "buy", "1", "10", "2024-04-02"),
        ]];
        let ledger = normalize(&rows, &no_aliases(), &no_suppression()).unwrap();
        assert_eq!(ledger.trades("A").unwrap().len(), 3);
    }

    #[test]
    fn aliases_coalesce_before_grouping() {
        let mut aliases = BTreeMap::new();
        aliases.insert("INFY-BE".to_string(), "INFY".to_string());
        let rows = vec![vec![
            rec("INFY", "buy", "5", "1500", "2024-04-01"),
            rec("INFY-BE", "buy", "3", "1510", "2024-04-02"),
        ]];
        let ledger = normalize(&rows, &aliases, &no_suppression()).unwrap();
        assert_eq!(ledger.instrument_count(), 1);
        assert_eq!(ledger.trades("INFY").unwrap().len(), 2);
        assert!(ledger.trades("INFY-BE").is_none());
    }

    #[test]
    fn ordering_is_timestamp_then_arrival() {
        // Same timestamp: the sequence-1 row arrived after the sequence-0
        // rows and must stay behind them.
        let rows = vec![
            vec![
                rec("A", "buy", "1", "20", "2024-04-02"),
                rec("A", "buy", "1", "10", "2024-04-01"),
                rec("A", "buy", "1", "30", "2024-04-02"),
            ],
            vec![rec("A", "buy", "1", "40", "2024-04-02")],
        ];
        let ledger = normalize(&rows, &no_aliases(), &no_suppression()).unwrap();
        let prices: Vec<String> = ledger
            .trades("A")
            .unwrap()
            .iter()
            .map(|t| t.price.to_string())
            .collect();
        assert_eq!(prices, ["10.00", "20.00", "30.00", "40.00"]);
    }

    #[test]
    fn suppression_hides_only_fully_exited_instruments() {
        let mut suppressed = BTreeSet::new();
        suppressed.insert("XYZ".to_string());

        // Fully exited: hidden.
        let rows = vec![vec![
            rec("XYZ", "buy", "10", "100", "2024-04-01"),
            rec("XYZ", "sell", "10", "110", "2024-05-01"),
        ]];
        let ledger = normalize(&rows, &no_aliases(), &suppressed).unwrap();
        assert!(ledger.trades("XYZ").is_none());

        // Still holding: suppression does not apply.
        let rows = vec![vec![
            rec("XYZ", "buy", "10", "100", "2024-04-01"),
            rec("XYZ", "sell", "4", "110", "2024-05-01"),
        ]];
        let ledger = normalize(&rows, &no_aliases(), &suppressed).unwrap();
        assert_eq!(ledger.trades("XYZ").unwrap().len(), 2);
    }

    #[test]
    fn suppression_is_reevaluated_per_invocation() {
        let mut suppressed = BTreeSet::new();
        suppressed.insert("XYZ".to_string());

        let exited = vec![vec![
            rec("XYZ", "buy", "10", "100", "2024-04-01"),
            rec("XYZ", "sell", "10", "110", "2024-05-01"),
        ]];
        assert!(normalize(&exited, &no_aliases(), &suppressed)
            .unwrap()
            .trades("XYZ")
            .is_none());

        // Bought again later: the same suppression set no longer hides it.
        let mut rebought = exited.clone();
        rebought[0].push(rec("XYZ", "buy", "5", "120", "2024-06-01"));
        let ledger = normalize(&rebought, &no_aliases(), &suppressed).unwrap();
        assert_eq!(ledger.trades("XYZ").unwrap().len(), 3);
    }

    #[test]
    fn oversold_instruments_count_as_exited_for_suppression() {
        // Net negative (data gap): suppression still hides it.
        let mut suppressed = BTreeSet::new();
        suppressed.insert("GAP".to_string());
        let rows = vec![vec![rec("GAP", "sell", "5", "100", "2024-04-01")]];
        let ledger = normalize(&rows, &no_aliases(), &suppressed).unwrap();
        assert!(ledger.trades("GAP").is_none());
    }

    #[test]
    fn empty_input_yields_empty_ledger() {
        let ledger = normalize(&[], &no_aliases(), &no_suppression()).unwrap();
        assert!(ledger.is_empty());
        assert_eq!(ledger.trade_count(), 0);
    }
}
