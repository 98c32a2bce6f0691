//! # Balance Projection
//!
//! Projects account, benefit and credit-card balances forward one day at a
//! time by replaying salary credits, monthly benefit credits, card due dates,
//! one-off transactions and transfers.
//!
//! ## Design Principles
//!
//! - **Fixed-point arithmetic**: Uses `rust_decimal` via [`Money`]
//! - **Derived recurring events**: Rebuilt in memory for every run, never stored
//! - **Ordered same-day application**: salary, then credits and transactions,
//!   then transfers, then the card payment
//! - **Deterministic output**: Ordered maps everywhere, identical inputs give
//!   identical rows and event log
//!
//! ## Example
//!
//! ```no_run
//! use balance_projection::{MemoryLedger, ProjectionService, Scenario};
//! use chrono::NaiveDate;
//! use std::io::Cursor;
//!
//! let scenario = Scenario::from_reader(Cursor::new(r#"{"salary": {"amount": "5000", "pay_day": 5}}"#)).unwrap();
//! let service = ProjectionService::new(&scenario).unwrap();
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let projection = service.run(&MemoryLedger::new(), start, 60).unwrap();
//! projection.write_rows(std::io::stdout(), service.account_names()).unwrap();
//! ```

pub mod account;
pub mod calendar;
pub mod config;
pub mod consolidate;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod money;
pub mod recurring;
pub mod service;
pub mod transaction;

pub use account::{Account, AccountId, AccountKind, BenefitBalance, Card, Salary};
pub use calendar::{DateRange, Window};
pub use config::{OpeningBalances, RecurringRules, Scenario};
pub use consolidate::{consolidate, Event, EventKind, Schedule};
pub use engine::{simulate, EventLogEntry, Projection, SimulationRow};
pub use error::{EngineError, Result};
pub use ledger::{LedgerReader, MemoryLedger};
pub use money::Money;
pub use recurring::generate_recurring;
pub use service::ProjectionService;
pub use transaction::{LedgerEntry, LedgerRecord, Transaction, TransactionTarget, Transfer};
