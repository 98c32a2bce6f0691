//! Merges recurring events and ledger entries into one per-day schedule.
//!
//! Same-day events are applied in a fixed order:
//!
//! 1. salary credits
//! 2. benefit credits and direct transactions
//! 3. transfer legs
//! 4. card payment
//!
//! so a salary landing on the card's due date is in the account before the
//! invoice is paid. Within a rank, insertion order is kept: recurring events
//! first, then ledger entries in `(date, id)` order.

use crate::account::AccountId;
use crate::calendar::Window;
use crate::money::Money;
use crate::transaction::{Transaction, TransactionTarget, Transfer};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;

/// What an event does to the balance state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Monthly salary into the primary account.
    Salary { account: AccountId },

    /// Monthly benefit credit.
    BenefitCredit { key: String },

    /// One-off transaction on a cash account.
    AccountEntry { account: AccountId },

    /// One-off transaction on a benefit balance.
    BenefitEntry { key: String },

    /// One-off transaction on the card invoice.
    CardCharge,

    /// Outgoing leg of a transfer.
    TransferDebit { from: AccountId, to: AccountId },

    /// Incoming leg of a transfer.
    TransferCredit { from: AccountId, to: AccountId },

    /// Invoice settlement from the primary account. The amount is resolved
    /// from the card balance when applied.
    CardPayment { account: AccountId },
}

impl EventKind {
    /// Same-day application rank, lowest first.
    pub fn priority(&self) -> u8 {
        match self {
            EventKind::Salary { .. } => 1,
            EventKind::BenefitCredit { .. }
            | EventKind::AccountEntry { .. }
            | EventKind::BenefitEntry { .. }
            | EventKind::CardCharge => 2,
            EventKind::TransferDebit { .. } | EventKind::TransferCredit { .. } => 3,
            EventKind::CardPayment { .. } => 4,
        }
    }
}

/// Short tag used in the event log.
impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Salary { .. } => write!(f, "account:primary"),
            EventKind::AccountEntry { account } => write!(f, "account:{}", account),
            EventKind::BenefitCredit { key } | EventKind::BenefitEntry { key } => {
                write!(f, "benefit:{}", key)
            }
            EventKind::CardCharge => write!(f, "card:charge"),
            EventKind::TransferDebit { from, .. } => write!(f, "transfer:from:{}", from),
            EventKind::TransferCredit { to, .. } => write!(f, "transfer:to:{}", to),
            EventKind::CardPayment { .. } => write!(f, "card:pay"),
        }
    }
}

/// A normalized, dated event ready to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub date: NaiveDate,
    pub description: String,

    /// Nominal signed amount. Zero placeholder for card payments.
    pub amount: Money,

    pub kind: EventKind,
}

impl Event {
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Money, kind: EventKind) -> Self {
        Event {
            date,
            description: description.into(),
            amount,
            kind,
        }
    }
}

impl From<&Transaction> for Event {
    fn from(txn: &Transaction) -> Self {
        let kind = match &txn.target {
            TransactionTarget::Account(account) => EventKind::AccountEntry { account: *account },
            TransactionTarget::Card => EventKind::CardCharge,
            TransactionTarget::Benefit(key) => EventKind::BenefitEntry { key: key.clone() },
        };
        Event::new(txn.date, txn.description.clone(), txn.amount, kind)
    }
}

/// Splits a transfer into its debit and credit legs, in that order.
pub fn transfer_legs(transfer: &Transfer) -> [Event; 2] {
    let (from, to) = (transfer.from, transfer.to);
    [
        Event::new(
            transfer.date,
            transfer.description.clone(),
            -transfer.amount,
            EventKind::TransferDebit { from, to },
        ),
        Event::new(
            transfer.date,
            transfer.description.clone(),
            transfer.amount,
            EventKind::TransferCredit { from, to },
        ),
    ]
}

/// Events grouped by date, each day already in application order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schedule {
    days: BTreeMap<NaiveDate, Vec<Event>>,
}

impl Schedule {
    /// Events for `date`, empty if none.
    pub fn events_on(&self, date: NaiveDate) -> &[Event] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of events.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Dates with at least one event, ascending.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    fn push(&mut self, event: Event) {
        self.days.entry(event.date).or_default().push(event);
    }

    fn sort_days(&mut self) {
        // sort_by_key is stable, so insertion order breaks ties
        for events in self.days.values_mut() {
            events.sort_by_key(|e| e.kind.priority());
        }
    }
}

/// Builds the schedule for `window` from recurring events and ledger entries.
///
/// Entries dated outside the window are dropped.
pub fn consolidate(
    window: &Window,
    recurring: Vec<Event>,
    transactions: &[Transaction],
    transfers: &[Transfer],
) -> Schedule {
    let mut schedule = Schedule::default();

    let ledger_events = transactions
        .iter()
        .map(Event::from)
        .chain(transfers.iter().flat_map(transfer_legs));

    for event in recurring.into_iter().chain(ledger_events) {
        if window.contains(event.date) {
            schedule.push(event);
        }
    }

    schedule.sort_days();
    schedule
}
