//! Scenario loading: current balances plus the recurring rules.
//!
//! A scenario is a JSON document. Everything except the account list is
//! optional, and [`Scenario::ensure_defaults`] fills in what is missing the
//! same way a fresh installation would: a primary checking account, a card due
//! on the 10th, a zero salary paid on the 5th, and the meal and food benefits.

use crate::account::{Account, AccountId, AccountKind, BenefitBalance, Card, Salary};
use crate::error::{EngineError, Result};
use crate::money::Money;
use chrono::NaiveDate;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

/// Default projection length.
pub const DEFAULT_DAYS: i64 = 60;

/// Longest window the service accepts.
pub const DEFAULT_MAX_DAYS: i64 = 365;

/// A projection scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// First simulated day. The CLI uses today when absent.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default = "default_days")]
    pub days: i64,

    #[serde(default = "default_max_days")]
    pub max_days: i64,

    #[serde(default)]
    pub accounts: Vec<Account>,

    #[serde(default)]
    pub card: Option<Card>,

    #[serde(default)]
    pub salary: Option<Salary>,

    #[serde(default)]
    pub benefits: Option<Vec<BenefitBalance>>,
}

fn default_days() -> i64 {
    DEFAULT_DAYS
}

fn default_max_days() -> i64 {
    DEFAULT_MAX_DAYS
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            start_date: None,
            days: DEFAULT_DAYS,
            max_days: DEFAULT_MAX_DAYS,
            accounts: Vec::new(),
            card: None,
            salary: None,
            benefits: None,
        }
    }
}

impl Scenario {
    /// Reads a scenario from JSON and applies defaults.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let scenario: Scenario = serde_json::from_reader(reader)?;
        scenario.ensure_defaults()
    }

    /// Fills in missing entities and normalizes the card sign.
    ///
    /// Fails when no id is left for the default primary account.
    pub fn ensure_defaults(mut self) -> Result<Self> {
        if !self.accounts.iter().any(Account::is_primary) {
            let id = match self.accounts.iter().map(|a| a.id).max() {
                Some(max) => max.checked_add(1).ok_or_else(|| {
                    EngineError::InvalidRule(format!(
                        "no account id left for the default primary account after {}",
                        max
                    ))
                })?,
                None => 1,
            };
            debug!("No primary account in scenario, adding default with id {}", id);
            self.accounts.insert(
                0,
                Account::new(id, "Conta Corrente", AccountKind::Primary, Money::ZERO),
            );
        }
        self.card = Some(self.card.take().unwrap_or_default().normalized());
        if self.salary.is_none() {
            self.salary = Some(Salary::default());
        }
        if self.benefits.is_none() {
            self.benefits = Some(BenefitBalance::defaults());
        }
        Ok(self)
    }

    /// The card, or the default card if none was configured.
    pub fn card(&self) -> Card {
        self.card.clone().unwrap_or_default().normalized()
    }

    pub fn salary(&self) -> Salary {
        self.salary.clone().unwrap_or_default()
    }

    pub fn benefits(&self) -> &[BenefitBalance] {
        self.benefits.as_deref().unwrap_or(&[])
    }

    /// The single primary account.
    pub fn primary_account(&self) -> Result<AccountId> {
        let primaries: Vec<AccountId> = self
            .accounts
            .iter()
            .filter(|a| a.is_primary())
            .map(|a| a.id)
            .collect();
        match primaries.as_slice() {
            [] => Err(EngineError::MissingPrimaryAccount),
            [id] => Ok(*id),
            _ => Err(EngineError::MultiplePrimaryAccounts(primaries)),
        }
    }

    /// Recurring rules derived from the salary, card and benefits.
    pub fn recurring_rules(&self) -> Result<RecurringRules> {
        let salary = self.salary();
        let card = self.card();
        let rules = RecurringRules {
            salary_amount: salary.amount,
            salary_pay_day: salary.pay_day,
            card_due_day: card.due_day,
            benefit_credits: self
                .benefits()
                .iter()
                .map(|b| BenefitCredit {
                    key: b.key.clone(),
                    name: b.name.clone(),
                    amount: b.monthly_credit,
                })
                .collect(),
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Current balances, as the engine's starting point.
    pub fn opening_balances(&self) -> OpeningBalances {
        OpeningBalances {
            accounts: self.accounts.iter().map(|a| (a.id, a.balance)).collect(),
            benefits: self
                .benefits()
                .iter()
                .map(|b| (b.key.clone(), b.balance))
                .collect(),
            card: self.card().open_amount,
        }
    }
}

/// Balances at the start of the window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpeningBalances {
    pub accounts: BTreeMap<AccountId, Money>,
    pub benefits: BTreeMap<String, Money>,

    /// Outstanding card invoice. Stored as `-abs` of whatever is given.
    pub card: Money,
}

/// One monthly benefit credit.
#[derive(Debug, Clone, PartialEq)]
pub struct BenefitCredit {
    pub key: String,
    pub name: String,
    pub amount: Money,
}

/// Parameters of the monthly recurring events.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringRules {
    pub salary_amount: Money,
    pub salary_pay_day: u32,
    pub card_due_day: u32,
    pub benefit_credits: Vec<BenefitCredit>,
}

impl RecurringRules {
    /// Rejects days outside 1..=31.
    ///
    /// Days that exist in some months but not others (31, or 29-30 in
    /// February) pass here and fail when a month without them is generated.
    pub fn validate(&self) -> Result<()> {
        for (what, day) in [("salary pay day", self.salary_pay_day), ("card due day", self.card_due_day)] {
            if !(1..=31).contains(&day) {
                return Err(EngineError::InvalidRule(format!(
                    "{} must be between 1 and 31, got {}",
                    what, day
                )));
            }
        }
        Ok(())
    }
}
