//! Boundary around the engine.
//!
//! Enforces what the engine trusts its callers to have checked: a single
//! primary account, sane rule days, a bounded window, and ledger entries that
//! only name configured benefits. Reads everything up front, then runs the
//! projection in one pass.

use crate::account::AccountId;
use crate::calendar::Window;
use crate::config::{OpeningBalances, RecurringRules, Scenario};
use crate::consolidate::consolidate;
use crate::engine::{simulate, Projection};
use crate::error::{EngineError, Result};
use crate::ledger::LedgerReader;
use crate::recurring::generate_recurring;
use crate::transaction::TransactionTarget;
use chrono::NaiveDate;
use log::info;
use std::collections::{BTreeMap, BTreeSet};

/// Runs projections for one scenario.
#[derive(Debug, Clone)]
pub struct ProjectionService {
    primary: AccountId,
    rules: RecurringRules,
    opening: OpeningBalances,
    account_names: BTreeMap<AccountId, String>,
    max_days: i64,
}

impl ProjectionService {
    /// Resolves the primary account and recurring rules once.
    pub fn new(scenario: &Scenario) -> Result<Self> {
        Ok(ProjectionService {
            primary: scenario.primary_account()?,
            rules: scenario.recurring_rules()?,
            opening: scenario.opening_balances(),
            account_names: scenario
                .accounts
                .iter()
                .map(|a| (a.id, a.name.clone()))
                .collect(),
            max_days: scenario.max_days,
        })
    }

    pub fn primary_account(&self) -> AccountId {
        self.primary
    }

    /// Display names by account id, for output headers.
    pub fn account_names(&self) -> &BTreeMap<AccountId, String> {
        &self.account_names
    }

    /// Projects `days` days starting at `start`.
    pub fn run<L: LedgerReader + ?Sized>(&self, ledger: &L, start: NaiveDate, days: i64) -> Result<Projection> {
        if days < 0 {
            return Err(EngineError::NegativeWindow(days));
        }
        if days > self.max_days {
            return Err(EngineError::WindowTooLong {
                days,
                max: self.max_days,
            });
        }
        let count = u64::try_from(days).map_err(|_| EngineError::NegativeWindow(days))?;
        let window = Window::new(start, count);
        let Some(end) = window.end() else {
            if count > 0 {
                return Err(EngineError::WindowOutOfRange { start, days });
            }
            return simulate(&self.opening, &Default::default(), start, days);
        };

        let transactions = ledger.transactions_in_window(start, end);
        let transfers = ledger.transfers_in_window(start, end);

        let known_benefits: BTreeSet<&str> = self.opening.benefits.keys().map(String::as_str).collect();
        for txn in &transactions {
            if let TransactionTarget::Benefit(key) = &txn.target {
                if !known_benefits.contains(key.as_str()) {
                    return Err(EngineError::UnknownBenefit {
                        id: txn.id,
                        key: key.clone(),
                    });
                }
            }
        }

        let recurring = generate_recurring(&window, &self.rules, self.primary)?;
        info!(
            "Projecting {} to {}: {} recurring events, {} transactions, {} transfers",
            start,
            end,
            recurring.len(),
            transactions.len(),
            transfers.len()
        );

        let schedule = consolidate(&window, recurring, &transactions, &transfers);
        simulate(&self.opening, &schedule, start, days)
    }
}
