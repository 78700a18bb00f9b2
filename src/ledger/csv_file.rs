//! CSV file ledger.

use super::entry::{BlurLevel, LedgerEntry, NOT_APPLICABLE};
use super::{Ledger, LedgerError};
use crate::game::Interpretation;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Column layout of one ledger row.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerRow {
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Blur level")]
    blur_level: String,
    #[serde(rename = "Time (sec)")]
    time: String,
    #[serde(rename = "Guess")]
    guess: String,
    #[serde(rename = "Score")]
    score: u32,
    #[serde(rename = "Interpretation")]
    interpretation: String,
}

impl From<&LedgerEntry> for LedgerRow {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            image: entry.image.clone(),
            blur_level: entry.blur_level.to_string(),
            time: entry
                .elapsed_secs
                .map(|secs| format!("{:.2}", secs))
                .unwrap_or_else(|| NOT_APPLICABLE.to_string()),
            guess: entry.guess.clone(),
            score: entry.score,
            interpretation: entry.interpretation.label().to_string(),
        }
    }
}

impl LedgerRow {
    fn into_entry(self, line: u64) -> Result<LedgerEntry, LedgerError> {
        let malformed = |reason: String| LedgerError::Malformed { line, reason };

        let blur_level = self.blur_level.parse::<BlurLevel>().map_err(malformed)?;
        let elapsed_secs = match self.time.trim() {
            NOT_APPLICABLE => None,
            text => Some(
                text.parse::<f64>()
                    .map_err(|_| malformed(format!("invalid time: {:?}", text)))?,
            ),
        };
        let interpretation = self
            .interpretation
            .parse::<Interpretation>()
            .map_err(malformed)?;

        Ok(LedgerEntry {
            image: self.image,
            blur_level,
            elapsed_secs,
            guess: self.guess,
            score: self.score,
            interpretation,
        })
    }
}

/// Destination of an encoded row.
trait RowSink: Write {
    fn sync(&mut self) -> io::Result<()>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl RowSink for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Writes and syncs one row, or cuts the sink back to `committed_len`.
///
/// A failure at any point leaves no trace of the row, so a retried append
/// neither lands on a torn tail nor duplicates a row the caller was told
/// had failed.
fn write_row(sink: &mut impl RowSink, committed_len: u64, bytes: &[u8]) -> io::Result<()> {
    let Err(e) = sink.write_all(bytes).and_then(|()| sink.sync()) else {
        return Ok(());
    };
    if let Err(rollback) = sink.truncate(committed_len) {
        tracing::error!(
            error = %rollback,
            committed_len,
            "Failed to roll back partial ledger row"
        );
    }
    Err(e)
}

/// Append-only ledger stored as a CSV file.
///
/// The header is written once, when the file is missing or empty. Each row
/// is encoded in memory and written with a single append, under a lock, so
/// rows from concurrent sessions never interleave.
#[derive(Debug)]
pub struct CsvLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode_row(entry: &LedgerEntry, with_header: bool) -> Result<Vec<u8>, LedgerError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(with_header)
            .from_writer(Vec::new());
        writer.serialize(LedgerRow::from(entry))?;
        writer
            .into_inner()
            .map_err(|e| LedgerError::Io(e.into_error()))
    }
}

impl Ledger for CsvLedger {
    fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
        // The guarded value is unit, so a poisoned lock carries no bad state.
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let committed_len = file.metadata()?.len();

        let bytes = Self::encode_row(entry, committed_len == 0)?;
        write_row(&mut file, committed_len, &bytes)?;

        tracing::debug!(
            path = %self.path.display(),
            image = %entry.image,
            blur_level = %entry.blur_level,
            score = entry.score,
            "Appended ledger row"
        );
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?.clone();
        let mut entries = Vec::new();

        for result in reader.records() {
            let record = result?;
            let line = record.position().map_or(0, |pos| pos.line());
            let row: LedgerRow = record.deserialize(Some(&headers))?;
            entries.push(row.into_entry(line)?);
        }

        Ok(entries)
    }
}
