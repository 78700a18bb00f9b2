//! Result ledger.
//!
//! Durable, append-only record of every completed round. The game
//! controller only appends; the aggregator is the only reader.

mod csv_file;
mod entry;
mod memory;

pub use csv_file::CsvLedger;
pub use entry::{BlurLevel, LedgerEntry, NOT_APPLICABLE};
pub use memory::MemoryLedger;

use thiserror::Error;

/// Errors raised by ledger storage.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed ledger row at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

/// Append-only store of completed rounds.
///
/// Implementations must make each `append` atomic with respect to other
/// appends: a row is either fully written or not at all, and rows from
/// concurrent callers never interleave.
pub trait Ledger: Send + Sync {
    /// Appends one entry.
    fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError>;

    /// Reads every entry in append order.
    fn read_all(&self) -> Result<Vec<LedgerEntry>, LedgerError>;
}
