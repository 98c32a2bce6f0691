//! Property tests for window shape and money conservation.

use balance_projection::{LedgerEntry, MemoryLedger, Money, ProjectionService, Scenario, Transfer};
use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::io::Cursor;

fn service(pay_day: u32, due_day: u32) -> ProjectionService {
    let json = format!(
        r#"{{
            "accounts": [
                {{"id": 1, "name": "Conta Corrente", "kind": "primary", "balance": "1000"}},
                {{"id": 2, "name": "Caixinha", "kind": "sub_account", "balance": "200"}}
            ],
            "salary": {{"amount": "0", "pay_day": {}}},
            "card": {{"due_day": {}, "open_amount": "0"}},
            "benefits": []
        }}"#,
        pay_day, due_day
    );
    let scenario = Scenario::from_reader(Cursor::new(json)).unwrap();
    ProjectionService::new(&scenario).unwrap()
}

fn start_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

proptest! {
    #[test]
    fn rows_cover_window_exactly(
        start in start_date(),
        days in 0i64..=365,
        pay_day in 1u32..=28,
        due_day in 1u32..=28,
    ) {
        let projection = service(pay_day, due_day).run(&MemoryLedger::new(), start, days).unwrap();

        prop_assert_eq!(projection.rows.len() as i64, days);
        if let Some(first) = projection.rows.first() {
            prop_assert_eq!(first.date, start);
        }
        for pair in projection.rows.windows(2) {
            prop_assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
        }
    }

    #[test]
    fn transfers_conserve_money(
        transfers in prop::collection::vec((0u64..60, 1i64..100_000, any::<bool>()), 0..20),
    ) {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let ledger = MemoryLedger::from_entries(transfers.iter().enumerate().map(
            |(i, (offset, cents, outward))| {
                let (from, to) = if *outward { (1, 2) } else { (2, 1) };
                LedgerEntry::Transfer(Transfer {
                    id: i as u32,
                    description: format!("transfer {}", i),
                    amount: Money::new(Decimal::new(*cents, 2)),
                    date: start.checked_add_days(Days::new(*offset)).unwrap(),
                    from,
                    to,
                })
            },
        ));

        let projection = service(5, 10).run(&ledger, start, 60).unwrap();
        let total = Money::from(1200);
        for row in &projection.rows {
            prop_assert_eq!(row.accounts[&1] + row.accounts[&2], total);
        }
    }
}
