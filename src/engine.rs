//! Day-by-day balance projection.
//!
//! Walks the window one day at a time, applies that day's scheduled events in
//! order to an engine-local balance state, and snapshots the state after each
//! day. The engine is a pure function of its inputs: the opening balances are
//! copied in, never written back.

use crate::account::AccountId;
use crate::calendar::Window;
use crate::config::OpeningBalances;
use crate::consolidate::{Event, EventKind, Schedule};
use crate::error::{EngineError, Result};
use crate::money::Money;
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Balances after one simulated day.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRow {
    pub date: NaiveDate,
    pub accounts: BTreeMap<AccountId, Money>,
    pub benefits: BTreeMap<String, Money>,

    /// Outstanding card invoice, `<= 0` unless refunds exceed charges.
    pub card: Money,
}

/// One applied event.
///
/// `amount` is what actually moved, which for a card payment is the invoice
/// settled rather than the scheduled placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct EventLogEntry {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub target: EventKind,
}

/// Output of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    /// One row per simulated day, ascending.
    pub rows: Vec<SimulationRow>,

    /// Applied events in application order.
    pub events: Vec<EventLogEntry>,
}

/// Mutable balances for the duration of one run.
///
/// # Invariants
///
/// - Transfers move money between two known accounts or do nothing
/// - A card payment leaves the card balance at exactly zero
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceState {
    accounts: BTreeMap<AccountId, Money>,
    benefits: BTreeMap<String, Money>,
    card: Money,
}

impl BalanceState {
    /// Seeds the state from opening balances. The card is taken as `-abs`.
    pub fn new(opening: &OpeningBalances) -> Self {
        BalanceState {
            accounts: opening.accounts.clone(),
            benefits: opening.benefits.clone(),
            card: -opening.card.abs(),
        }
    }

    pub fn account(&self, id: AccountId) -> Money {
        self.accounts.get(&id).copied().unwrap_or(Money::ZERO)
    }

    pub fn benefit(&self, key: &str) -> Money {
        self.benefits.get(key).copied().unwrap_or(Money::ZERO)
    }

    pub fn card(&self) -> Money {
        self.card
    }

    /// Applies one event and returns the realized amount.
    ///
    /// Returns `None` when the event was skipped: a transfer leg naming an
    /// account that is not in the state.
    pub fn apply(&mut self, event: &Event) -> Option<Money> {
        match &event.kind {
            EventKind::Salary { account } | EventKind::AccountEntry { account } => {
                *self.accounts.entry(*account).or_default() += event.amount;
                Some(event.amount)
            }
            EventKind::BenefitCredit { key } | EventKind::BenefitEntry { key } => {
                *self.benefits.entry(key.clone()).or_default() += event.amount;
                Some(event.amount)
            }
            EventKind::CardCharge => {
                self.card += event.amount;
                Some(event.amount)
            }
            EventKind::TransferDebit { from, to } => {
                if !self.knows_both(*from, *to) {
                    warn!(
                        "{}: skipping transfer '{}' from {} to {}: unknown account",
                        event.date, event.description, from, to
                    );
                    return None;
                }
                *self.accounts.entry(*from).or_default() += event.amount;
                Some(event.amount)
            }
            EventKind::TransferCredit { from, to } => {
                if !self.knows_both(*from, *to) {
                    return None;
                }
                *self.accounts.entry(*to).or_default() += event.amount;
                Some(event.amount)
            }
            EventKind::CardPayment { account } => {
                if self.card.is_zero() {
                    return Some(Money::ZERO);
                }
                // Pays the whole invoice; the account may go negative
                let payment = self.card.abs();
                *self.accounts.entry(*account).or_default() -= payment;
                self.card = Money::ZERO;
                Some(-payment)
            }
        }
    }

    fn knows_both(&self, from: AccountId, to: AccountId) -> bool {
        self.accounts.contains_key(&from) && self.accounts.contains_key(&to)
    }

    /// Copies the current balances into a row for `date`.
    pub fn snapshot(&self, date: NaiveDate) -> SimulationRow {
        SimulationRow {
            date,
            accounts: self.accounts.clone(),
            benefits: self.benefits.clone(),
            card: self.card,
        }
    }
}

/// Projects balances over `[start, start + days)`.
///
/// Produces exactly `days` rows. `days == 0` gives an empty projection and a
/// negative `days` is an error.
pub fn simulate(opening: &OpeningBalances, schedule: &Schedule, start: NaiveDate, days: i64) -> Result<Projection> {
    let count = u64::try_from(days).map_err(|_| EngineError::NegativeWindow(days))?;
    let window = Window::new(start, count);
    if count > 0 && window.end().is_none() {
        return Err(EngineError::WindowOutOfRange { start, days });
    }

    let mut state = BalanceState::new(opening);
    let mut projection = Projection {
        rows: Vec::new(),
        events: Vec::new(),
    };

    for date in window.dates() {
        for event in schedule.events_on(date) {
            let Some(realized) = state.apply(event) else {
                continue;
            };
            debug!("{}: {} [{}] {}", date, event.description, event.kind, realized);
            projection.events.push(EventLogEntry {
                date,
                description: event.description.clone(),
                amount: realized,
                target: event.kind.clone(),
            });
        }
        projection.rows.push(state.snapshot(date));
    }

    info!(
        "Simulated {} days from {}: {} events applied",
        projection.rows.len(),
        start,
        projection.events.len()
    );
    Ok(projection)
}

impl Projection {
    /// Row for `date`, if it is inside the window.
    pub fn row_on(&self, date: NaiveDate) -> Option<&SimulationRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .and_then(|idx| self.rows.get(idx))
    }

    /// Final balances, if any day was simulated.
    pub fn last(&self) -> Option<&SimulationRow> {
        self.rows.last()
    }

    /// Event log sorted by date. Same-day entries keep application order.
    pub fn sorted_events(&self) -> Vec<&EventLogEntry> {
        let mut events: Vec<_> = self.events.iter().collect();
        events.sort_by_key(|e| e.date);
        events
    }

    /// Writes one CSV row per day.
    ///
    /// Columns: `date`, one per account (named from `account_names`, falling
    /// back to `account <id>`), one per benefit key, then `card`. Amounts have
    /// 2 decimal places.
    pub fn write_rows<W: Write>(&self, writer: W, account_names: &BTreeMap<AccountId, String>) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let account_ids: BTreeSet<AccountId> = self
            .rows
            .iter()
            .flat_map(|r| r.accounts.keys().copied())
            .chain(account_names.keys().copied())
            .collect();
        let benefit_keys: BTreeSet<&str> = self
            .rows
            .iter()
            .flat_map(|r| r.benefits.keys().map(String::as_str))
            .collect();

        let mut header = vec!["date".to_string()];
        header.extend(account_ids.iter().map(|id| {
            account_names
                .get(id)
                .cloned()
                .unwrap_or_else(|| format!("account {}", id))
        }));
        header.extend(benefit_keys.iter().map(|k| k.to_string()));
        header.push("card".to_string());
        csv_writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.date.to_string()];
            record.extend(
                account_ids
                    .iter()
                    .map(|id| row.accounts.get(id).copied().unwrap_or(Money::ZERO).to_string()),
            );
            record.extend(
                benefit_keys
                    .iter()
                    .map(|k| row.benefits.get(*k).copied().unwrap_or(Money::ZERO).to_string()),
            );
            record.push(row.card.to_string());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Writes the event log as CSV, sorted by date.
    pub fn write_events<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["date", "description", "amount", "target"])?;
        for entry in self.sorted_events() {
            csv_writer.write_record([
                entry.date.to_string(),
                entry.description.clone(),
                entry.amount.to_string(),
                entry.target.to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
