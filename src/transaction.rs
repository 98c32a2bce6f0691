//! Ledger entry models for CSV parsing and internal representation.

use crate::account::AccountId;
use crate::calendar::{expand_date_range, DateRange};
use crate::money::Money;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Raw ledger record as read from CSV.
///
/// Columns that only apply to one kind of entry are optional; `parse` checks
/// that the right ones are present.
#[derive(Debug, Deserialize)]
pub struct LedgerRecord {
    /// Entry kind: transaction or transfer
    pub kind: String,

    /// Entry ID, unique within the ledger
    pub id: u32,

    /// First (or only) date of the entry
    pub date: String,

    /// Optional last date; the entry repeats daily through it
    pub until: Option<String>,

    pub description: String,

    /// Signed for transactions, positive for transfers
    pub amount: String,

    /// Transaction target: `account`, `card`, or a benefit key
    pub target: Option<String>,

    /// Target account for `account` transactions
    pub account: Option<AccountId>,

    /// Transfer source account
    pub from: Option<AccountId>,

    /// Transfer destination account
    pub to: Option<AccountId>,
}

impl LedgerRecord {
    /// Parses the raw CSV record into a typed entry.
    ///
    /// Transfer validation (`from != to`, positive amount) happens here, at the
    /// boundary, so the engine can trust what it is given.
    pub fn parse(&self) -> Result<ParsedEntry, String> {
        let kind = self.kind.trim().to_lowercase();
        let date = parse_date(&self.date)?;
        let until = match self.until.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(parse_date(s)?),
        };
        let dates = expand_date_range(date, until)
            .ok_or_else(|| format!("until {} precedes date {}", self.until.as_deref().unwrap_or(""), date))?;
        let amount = Money::from_str(&self.amount)
            .map_err(|e| format!("invalid amount '{}': {}", self.amount.trim(), e))?;
        let description = self.description.trim().to_string();

        let kind = match kind.as_str() {
            "transaction" => {
                let target = self.parse_target()?;
                EntryKind::Transaction { amount, target }
            }
            "transfer" => {
                let from = self.from.ok_or("transfer without 'from' account")?;
                let to = self.to.ok_or("transfer without 'to' account")?;
                if from == to {
                    return Err(format!("transfer from account {} to itself", from));
                }
                if !amount.is_positive() {
                    return Err(format!("transfer amount must be positive, got {}", amount));
                }
                EntryKind::Transfer { amount, from, to }
            }
            other => return Err(format!("unknown entry kind '{}'", other)),
        };

        Ok(ParsedEntry {
            id: self.id,
            description,
            dates,
            kind,
        })
    }

    fn parse_target(&self) -> Result<TransactionTarget, String> {
        let target = self.target.as_deref().map(str::trim).unwrap_or("");
        match target {
            "" => Err("transaction without target".to_string()),
            "account" => self
                .account
                .map(TransactionTarget::Account)
                .ok_or_else(|| "account transaction without 'account' id".to_string()),
            "card" => Ok(TransactionTarget::Card),
            key => Ok(TransactionTarget::Benefit(key.to_string())),
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", s.trim(), e))
}

/// A parsed ledger row, possibly covering several days.
#[derive(Debug, Clone)]
pub struct ParsedEntry {
    pub id: u32,
    pub description: String,
    pub dates: DateRange,
    pub kind: EntryKind,
}

impl ParsedEntry {
    /// One concrete entry per covered date.
    pub fn expand(&self) -> Vec<LedgerEntry> {
        self.dates
            .clone()
            .map(|date| match &self.kind {
                EntryKind::Transaction { amount, target } => LedgerEntry::Transaction(Transaction {
                    id: self.id,
                    description: self.description.clone(),
                    amount: *amount,
                    date,
                    target: target.clone(),
                }),
                EntryKind::Transfer { amount, from, to } => LedgerEntry::Transfer(Transfer {
                    id: self.id,
                    description: self.description.clone(),
                    amount: *amount,
                    date,
                    from: *from,
                    to: *to,
                }),
            })
            .collect()
    }
}

/// Kind-specific data of a ledger row.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    Transaction { amount: Money, target: TransactionTarget },
    Transfer { amount: Money, from: AccountId, to: AccountId },
}

/// Where a one-off transaction lands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionTarget {
    /// A cash account.
    Account(AccountId),

    /// The credit card invoice. Negative amounts are purchases.
    Card,

    /// A benefit balance, by key.
    Benefit(String),
}

impl fmt::Display for TransactionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionTarget::Account(id) => write!(f, "account:{}", id),
            TransactionTarget::Card => write!(f, "card"),
            TransactionTarget::Benefit(key) => write!(f, "benefit:{}", key),
        }
    }
}

/// A one-off transaction on a single date.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: u32,
    pub description: String,

    /// Signed amount: positive credits, negative debits.
    pub amount: Money,

    pub date: NaiveDate,
    pub target: TransactionTarget,
}

/// A movement of money between two accounts on a single date.
///
/// # Invariants
///
/// - `amount > 0`
/// - `from != to`
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub id: u32,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub from: AccountId,
    pub to: AccountId,
}

/// A concrete ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEntry {
    Transaction(Transaction),
    Transfer(Transfer),
}

impl LedgerEntry {
    pub fn date(&self) -> NaiveDate {
        match self {
            LedgerEntry::Transaction(t) => t.date,
            LedgerEntry::Transfer(t) => t.date,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            LedgerEntry::Transaction(t) => t.id,
            LedgerEntry::Transfer(t) => t.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: &str, amount: &str) -> LedgerRecord {
        LedgerRecord {
            kind: kind.to_string(),
            id: 7,
            date: "2025-03-10".to_string(),
            until: None,
            description: " Mercado ".to_string(),
            amount: amount.to_string(),
            target: None,
            account: None,
            from: None,
            to: None,
        }
    }

    #[test]
    fn test_parse_card_transaction() {
        let mut rec = record("transaction", "-250.00");
        rec.target = Some("card".to_string());

        let parsed = rec.parse().unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.description, "Mercado");
        match parsed.kind {
            EntryKind::Transaction { amount, target } => {
                assert_eq!(amount.to_string(), "-250.00");
                assert_eq!(target, TransactionTarget::Card);
            }
            _ => panic!("Expected Transaction"),
        }
    }

    #[test]
    fn test_parse_account_transaction_requires_account() {
        let mut rec = record("transaction", "800");
        rec.target = Some("account".to_string());
        assert!(rec.parse().is_err());

        rec.account = Some(3);
        let parsed = rec.parse().unwrap();
        assert!(matches!(
            parsed.kind,
            EntryKind::Transaction { target: TransactionTarget::Account(3), .. }
        ));
    }

    #[test]
    fn test_parse_benefit_transaction() {
        let mut rec = record("  Transaction ", "-35.5");
        rec.target = Some(" vale_refeicao ".to_string());
        let parsed = rec.parse().unwrap();
        match parsed.kind {
            EntryKind::Transaction { target, .. } => {
                assert_eq!(target, TransactionTarget::Benefit("vale_refeicao".to_string()));
                assert_eq!(target.to_string(), "benefit:vale_refeicao");
            }
            _ => panic!("Expected Transaction"),
        }
    }

    #[test]
    fn test_parse_rejects_self_transfer() {
        let mut rec = record("transfer", "100");
        rec.from = Some(1);
        rec.to = Some(1);
        let err = rec.parse().unwrap_err();
        assert!(err.contains("itself"));
    }

    #[test]
    fn test_parse_rejects_non_positive_transfer() {
        let mut rec = record("transfer", "-100");
        rec.from = Some(1);
        rec.to = Some(2);
        assert!(rec.parse().is_err());

        rec.amount = "0".to_string();
        assert!(rec.parse().is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_kind_and_bad_date() {
        assert!(record("refund", "10").parse().is_err());

        let mut rec = record("transaction", "10");
        rec.target = Some("card".to_string());
        rec.date = "10/03/2025".to_string();
        assert!(rec.parse().is_err());
    }

    #[test]
    fn test_until_expands_daily() {
        let mut rec = record("transfer", "50");
        rec.from = Some(1);
        rec.to = Some(2);
        rec.until = Some("2025-03-12".to_string());

        let entries = rec.parse().unwrap().expand();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].date(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(entries[2].date(), NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());
        assert!(entries.iter().all(|e| e.id() == 7));
    }

    #[test]
    fn test_until_before_date_is_rejected() {
        let mut rec = record("transaction", "10");
        rec.target = Some("card".to_string());
        rec.until = Some("2025-03-01".to_string());
        assert!(rec.parse().is_err());
    }
}
