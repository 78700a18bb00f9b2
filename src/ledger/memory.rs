//! In-memory ledger.

use super::{Ledger, LedgerEntry, LedgerError};
use std::sync::{Mutex, PoisonError};

/// Ledger kept in memory. Useful for tests and short-lived embedding.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: Mutex<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger pre-populated with entries.
    pub fn with_entries(entries: Vec<LedgerEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Ledger for MemoryLedger {
    fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
