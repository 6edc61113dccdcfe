use std::collections::{BTreeMap, BTreeSet};

use ldk_ledger::normalize;
use ldk_portfolio::{BookError, Portfolio};
use ldk_schemas::RawTradeRecord;

fn rec(instrument: &str, side: &str, qty: &str, price: &str, ts: &str) -> RawTradeRecord {
    RawTradeRecord::new(instrument, side, qty, price, ts)
}

#[test]
fn scenario_missing_history_surfaces_as_oversell() {
    // A tradebook that starts mid-history: the first sell has no lots to
    // consume.  The whole portfolio build fails; nothing partial escapes.
    let rows = vec![
        rec("TCS", "buy", "10", "3200", "2024-04-01"),
        rec("WIPRO", "sell", "15", "450", "2024-04-02"),
        rec("WIPRO", "buy", "15", "430", "2024-04-03"),
    ];
    let ledger = normalize(&[rows], &BTreeMap::new(), &BTreeSet::new()).unwrap();

    let err = Portfolio::from_ledger(&ledger).unwrap_err();
    match err {
        BookError::Oversell {
            instrument,
            shortfall,
            at,
        } => {
            assert_eq!(instrument, "WIPRO");
            assert_eq!(shortfall, 15);
            assert_eq!(at.date().to_string(), "2024-04-02");
        }
        other => panic!("expected oversell, got {other:?}"),
    }
}

#[test]
fn scenario_sell_beyond_remaining_reports_exact_shortfall() {
    let rows = vec![
        rec("TCS", "buy", "10", "3200", "2024-04-01"),
        rec("TCS", "sell", "6", "3300", "2024-04-05"),
        rec("TCS", "sell", "7", "3350", "2024-04-09"),
    ];
    let ledger = normalize(&[rows], &BTreeMap::new(), &BTreeSet::new()).unwrap();

    let err = Portfolio::from_ledger(&ledger).unwrap_err();
    match err {
        BookError::Oversell { shortfall, .. } => assert_eq!(shortfall, 3),
        other => panic!("expected oversell, got {other:?}"),
    }
}
