//! Ledger access: one-off transactions and transfers.
//!
//! The engine only ever reads the ledger, once per run, through
//! [`LedgerReader`]. [`MemoryLedger`] is the in-process implementation, loaded
//! from CSV in streaming fashion.

use crate::error::{EngineError, Result};
use crate::transaction::{LedgerEntry, LedgerRecord, Transaction, Transfer};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::io::Read;

/// Read access to the ledger for a date range.
///
/// Bounds are inclusive. Results are ordered by date, then by entry id, so
/// replaying them is deterministic.
pub trait LedgerReader {
    fn transactions_in_window(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transaction>;

    fn transfers_in_window(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transfer>;
}

/// In-memory ledger.
///
/// Entries are kept sorted by `(date, id)`; entries expanded from one CSV row
/// share an id and differ by date.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    transactions: Vec<Transaction>,
    transfers: Vec<Transfer>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from already-parsed entries.
    pub fn from_entries<I: IntoIterator<Item = LedgerEntry>>(entries: I) -> Self {
        let mut ledger = MemoryLedger::new();
        for entry in entries {
            ledger.insert(entry);
        }
        ledger
    }

    /// Loads ledger entries from CSV.
    ///
    /// Expected header: `kind,id,date,until,description,amount,target,account,from,to`.
    /// Invalid rows and duplicate ids are logged at warn level and skipped.
    /// I/O errors and a malformed header abort the load.
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);

        // Surface header problems instead of warning on every row
        csv_reader.headers()?;

        let mut ledger = MemoryLedger::new();
        let mut seen_ids = HashSet::new();
        let mut rows = 0usize;
        let mut skipped = 0usize;

        for (row_idx, result) in csv_reader.deserialize::<LedgerRecord>().enumerate() {
            let row_num = row_idx + 2; // 1-indexed, accounting for header row
            rows += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Row {}: CSV parse error: {}", row_num, e);
                    skipped += 1;
                    continue;
                }
            };

            let parsed = match record.parse() {
                Ok(parsed) => parsed,
                Err(message) => {
                    warn!("{}", EngineError::InvalidRecord { row: row_num, message });
                    skipped += 1;
                    continue;
                }
            };

            if !seen_ids.insert(parsed.id) {
                warn!("{}, ignoring", EngineError::DuplicateEntryId { id: parsed.id, row: row_num });
                skipped += 1;
                continue;
            }

            for entry in parsed.expand() {
                debug!("Row {}: loaded {:?}", row_num, entry);
                ledger.insert(entry);
            }
        }

        info!(
            "Loaded ledger: {} rows, {} skipped, {} transactions, {} transfers",
            rows,
            skipped,
            ledger.transactions.len(),
            ledger.transfers.len()
        );
        Ok(ledger)
    }

    /// Inserts an entry, keeping `(date, id)` order.
    pub fn insert(&mut self, entry: LedgerEntry) {
        match entry {
            LedgerEntry::Transaction(txn) => {
                let pos = self
                    .transactions
                    .partition_point(|t| (t.date, t.id) <= (txn.date, txn.id));
                self.transactions.insert(pos, txn);
            }
            LedgerEntry::Transfer(transfer) => {
                let pos = self
                    .transfers
                    .partition_point(|t| (t.date, t.id) <= (transfer.date, transfer.id));
                self.transfers.insert(pos, transfer);
            }
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }
}

impl LedgerReader for MemoryLedger {
    fn transactions_in_window(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| start <= t.date && t.date <= end)
            .cloned()
            .collect()
    }

    fn transfers_in_window(&self, start: NaiveDate, end: NaiveDate) -> Vec<Transfer> {
        self.transfers
            .iter()
            .filter(|t| start <= t.date && t.date <= end)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionTarget;
    use std::io::Cursor;

    const HEADER: &str = "kind,id,date,until,description,amount,target,account,from,to";

    fn load(rows: &str) -> MemoryLedger {
        let csv = format!("{}\n{}", HEADER, rows);
        MemoryLedger::from_csv(Cursor::new(csv)).unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[test]
    fn test_loads_transactions_and_transfers() {
        let ledger = load(
            "transaction,1,2025-03-10,,Mercado,-250.00,card,,,
transaction,2,2025-03-05,,Freela,800,account,1,,
transfer,3,2025-03-07,,Reserva,300,,,1,2",
        );

        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.transfers().len(), 1);
        // ordered by date, not by file order
        assert_eq!(ledger.transactions()[0].id, 2);
        assert_eq!(ledger.transactions()[0].target, TransactionTarget::Account(1));
        assert_eq!(ledger.transactions()[1].target, TransactionTarget::Card);
        assert_eq!(ledger.transfers()[0].from, 1);
        assert_eq!(ledger.transfers()[0].to, 2);
    }

    #[test]
    fn test_same_date_ordered_by_id() {
        let ledger = load(
            "transaction,9,2025-03-10,,Late id,-1,card,,,
transaction,4,2025-03-10,,Early id,-2,card,,,",
        );
        let ids: Vec<u32> = ledger.transactions().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn test_invalid_rows_skipped() {
        let ledger = load(
            "transaction,1,2025-03-10,,No target,-10,,,,
transfer,2,2025-03-10,,Self,100,,,1,1
transfer,3,2025-03-10,,Negative,-100,,,1,2
refund,4,2025-03-10,,Unknown,10,card,,,
transaction,5,not-a-date,,Bad date,10,card,,,
transaction,6,2025-03-10,,Good,-10,card,,,",
        );
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.transactions()[0].id, 6);
        assert!(ledger.transfers().is_empty());
    }

    #[test]
    fn test_duplicate_ids_skipped() {
        let ledger = load(
            "transaction,1,2025-03-10,,First,-10,card,,,
transaction,1,2025-03-11,,Second,-20,card,,,",
        );
        assert_eq!(ledger.transactions().len(), 1);
        assert_eq!(ledger.transactions()[0].description, "First");
    }

    #[test]
    fn test_until_expands_rows() {
        let ledger = load("transaction,1,2025-03-10,2025-03-14,Almoço,-35.5,vale_refeicao,,,");
        assert_eq!(ledger.transactions().len(), 5);
        assert_eq!(ledger.transactions()[4].date, d(14));
    }

    #[test]
    fn test_window_queries_are_inclusive() {
        let ledger = load(
            "transaction,1,2025-03-01,,A,-1,card,,,
transaction,2,2025-03-05,,B,-1,card,,,
transaction,3,2025-03-10,,C,-1,card,,,
transfer,4,2025-03-10,,D,5,,,1,2
transfer,5,2025-03-11,,E,5,,,1,2",
        );

        let txns = ledger.transactions_in_window(d(5), d(10));
        assert_eq!(txns.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3]);

        let transfers = ledger.transfers_in_window(d(5), d(10));
        assert_eq!(transfers.iter().map(|t| t.id).collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_whitespace_handling() {
        let csv = "kind, id, date, until, description, amount, target, account, from, to
 transfer , 1 , 2025-03-07 , , Reserva , 300 , , , 1 , 2 ";
        let ledger = MemoryLedger::from_csv(Cursor::new(csv)).unwrap();
        assert_eq!(ledger.transfers().len(), 1);
        assert_eq!(ledger.transfers()[0].description, "Reserva");
    }

    #[test]
    fn test_empty_ledger() {
        let ledger = MemoryLedger::from_csv(Cursor::new(HEADER)).unwrap();
        assert!(ledger.transactions().is_empty());
        assert!(ledger.transfers().is_empty());
    }
}
