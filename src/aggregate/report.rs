//! Timing series derived from the ledger.
//!
//! Both series are recomputed from scratch on every call; nothing is cached
//! between invocations.

use crate::ledger::{Ledger, LedgerEntry, LedgerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One point of the per-entry timing series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingPoint {
    /// 1-based position among entries that have a recorded time.
    pub position: usize,
    /// Image the round was played on.
    pub image: String,
    pub elapsed_secs: f64,
}

/// Mean response time for one blur level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlurLevelTiming {
    pub blur_level: u32,
    pub mean_elapsed_secs: f64,
    /// Number of rounds averaged.
    pub samples: usize,
}

/// Both derived views, ready for an external renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingReport {
    /// Elapsed time per round, in ledger order.
    pub per_entry: Vec<TimingPoint>,
    /// Mean elapsed time per solved blur level, ascending by level.
    pub per_blur_level: Vec<BlurLevelTiming>,
}

impl TimingReport {
    /// Computes both series over the given entries.
    pub fn from_entries(entries: &[LedgerEntry]) -> Self {
        Self {
            per_entry: Self::compute_per_entry(entries),
            per_blur_level: Self::compute_per_blur_level(entries),
        }
    }

    /// Reads the whole ledger and computes both series.
    pub fn from_ledger(ledger: &dyn Ledger) -> Result<Self, LedgerError> {
        let entries = ledger.read_all()?;
        let report = Self::from_entries(&entries);

        tracing::debug!(
            entries = entries.len(),
            timed = report.per_entry.len(),
            levels = report.per_blur_level.len(),
            "Aggregated ledger"
        );
        Ok(report)
    }

    /// Entries without a recorded time are skipped and do not take a position.
    fn compute_per_entry(entries: &[LedgerEntry]) -> Vec<TimingPoint> {
        entries
            .iter()
            .filter_map(|entry| entry.elapsed_secs.map(|secs| (entry, secs)))
            .enumerate()
            .map(|(i, (entry, elapsed_secs))| TimingPoint {
                position: i + 1,
                image: entry.image.clone(),
                elapsed_secs,
            })
            .collect()
    }

    /// Groups timed, solved entries by blur level and averages each group.
    fn compute_per_blur_level(entries: &[LedgerEntry]) -> Vec<BlurLevelTiming> {
        let mut groups: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

        let timed = entries
            .iter()
            .filter_map(|entry| Some((entry.blur_level.intensity()?, entry.elapsed_secs?)));

        for (level, secs) in timed {
            let group = groups.entry(level).or_insert((0.0, 0));
            group.0 += secs;
            group.1 += 1;
        }

        groups
            .into_iter()
            .map(|(blur_level, (total, samples))| BlurLevelTiming {
                blur_level,
                mean_elapsed_secs: total / samples as f64,
                samples,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.per_entry.is_empty() && self.per_blur_level.is_empty()
    }
}
