//! Balance-holding entities: accounts, the credit card, salary and benefits.
//!
//! These are the persisted side of a scenario. The engine reads their balances
//! once, at the start of a run, and never writes back to them.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Identifier of a cash account.
pub type AccountId = u32;

/// Category of a cash account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// The single checking account that receives salary and pays the card.
    Primary,
    /// Savings-like account ("caixinha"). Moves money only through transfers
    /// and transactions that name it explicitly.
    SubAccount,
}

/// A cash account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,

    /// Display name, used as the column header in projection output.
    pub name: String,

    /// Primary or sub-account.
    pub kind: AccountKind,

    /// Current balance. May be negative.
    #[serde(default)]
    pub balance: Money,
}

impl Account {
    /// Creates an account.
    pub fn new(id: AccountId, name: impl Into<String>, kind: AccountKind, balance: Money) -> Self {
        Account {
            id,
            name: name.into(),
            kind,
            balance,
        }
    }

    /// Returns `true` for the primary account.
    pub fn is_primary(&self) -> bool {
        self.kind == AccountKind::Primary
    }
}

/// The credit card.
///
/// # Sign Convention
///
/// `open_amount` is the unpaid invoice and is always held as a non-positive
/// figure. Inputs given as positive numbers are flipped by [`Card::normalized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Card {
    pub name: String,

    /// Day of month the invoice is due, moved back to a business day.
    pub due_day: u32,

    /// Outstanding invoice, `<= 0` once normalized.
    pub open_amount: Money,
}

impl Card {
    pub const DEFAULT_NAME: &'static str = "Cartão de Crédito";
    pub const DEFAULT_DUE_DAY: u32 = 10;

    /// Returns the card with `open_amount` forced to `-abs(open_amount)`.
    pub fn normalized(mut self) -> Self {
        self.open_amount = -self.open_amount.abs();
        self
    }
}

impl Default for Card {
    fn default() -> Self {
        Card {
            name: Self::DEFAULT_NAME.to_string(),
            due_day: Self::DEFAULT_DUE_DAY,
            open_amount: Money::ZERO,
        }
    }
}

/// Monthly salary credited to the primary account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Salary {
    pub amount: Money,
    pub pay_day: u32,
}

impl Salary {
    pub const DEFAULT_PAY_DAY: u32 = 5;
}

impl Default for Salary {
    fn default() -> Self {
        Salary {
            amount: Money::ZERO,
            pay_day: Self::DEFAULT_PAY_DAY,
        }
    }
}

/// A prepaid allowance ("vale") credited once a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitBalance {
    /// Stable key, e.g. `vale_refeicao`. Ledger entries target benefits by key.
    pub key: String,

    /// Display name.
    pub name: String,

    /// Current balance.
    #[serde(default)]
    pub balance: Money,

    /// Amount credited on the second-to-last business day of each month.
    #[serde(default)]
    pub monthly_credit: Money,
}

impl BenefitBalance {
    pub const MEAL_KEY: &'static str = "vale_refeicao";
    pub const FOOD_KEY: &'static str = "vale_alimentacao";

    pub fn new(key: impl Into<String>, name: impl Into<String>, monthly_credit: Money) -> Self {
        BenefitBalance {
            key: key.into(),
            name: name.into(),
            balance: Money::ZERO,
            monthly_credit,
        }
    }

    /// Meal and food allowances with their standard monthly credits.
    pub fn defaults() -> Vec<BenefitBalance> {
        vec![
            BenefitBalance::new(
                Self::MEAL_KEY,
                "Vale Refeição",
                Money::new(rust_decimal::Decimal::new(123640, 2)),
            ),
            BenefitBalance::new(
                Self::FOOD_KEY,
                "Vale Alimentação",
                Money::new(rust_decimal::Decimal::new(97416, 2)),
            ),
        ]
    }
}
