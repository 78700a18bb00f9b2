//! Metrics collection and registry.

use prometheus::{Encoder, Gauge, IntCounter, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics for game activity.
///
/// All recording methods take `&self`, so one instance can be shared
/// across sessions behind an `Arc`.
pub struct GameMetrics {
    registry: Registry,

    // Session metrics
    sessions_started: IntCounter,
    sessions_completed: IntCounter,
    last_average_score: Gauge,

    // Round metrics
    guesses_total: IntCounter,
    rounds_solved: IntCounter,
    rounds_unsolved: IntCounter,

    // Storage metrics
    ledger_write_failures: IntCounter,
}

impl GameMetrics {
    /// Creates a new registry with all game metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let sessions_started = IntCounter::new(
            "blur_recall_sessions_started_total",
            "Total number of sessions started",
        )?;
        let sessions_completed = IntCounter::new(
            "blur_recall_sessions_completed_total",
            "Total number of sessions played to the end",
        )?;
        let last_average_score = Gauge::new(
            "blur_recall_last_average_score",
            "Average round score of the most recently finished session",
        )?;

        let guesses_total = IntCounter::new(
            "blur_recall_guesses_total",
            "Total number of guesses submitted",
        )?;
        let rounds_solved = IntCounter::new(
            "blur_recall_rounds_solved_total",
            "Rounds ended by a correct guess",
        )?;
        let rounds_unsolved = IntCounter::new(
            "blur_recall_rounds_unsolved_total",
            "Rounds ended with every attempt used",
        )?;

        let ledger_write_failures = IntCounter::new(
            "blur_recall_ledger_write_failures_total",
            "Ledger appends that failed and left the round unresolved",
        )?;

        registry.register(Box::new(sessions_started.clone()))?;
        registry.register(Box::new(sessions_completed.clone()))?;
        registry.register(Box::new(last_average_score.clone()))?;
        registry.register(Box::new(guesses_total.clone()))?;
        registry.register(Box::new(rounds_solved.clone()))?;
        registry.register(Box::new(rounds_unsolved.clone()))?;
        registry.register(Box::new(ledger_write_failures.clone()))?;

        Ok(Self {
            registry,
            sessions_started,
            sessions_completed,
            last_average_score,
            guesses_total,
            rounds_solved,
            rounds_unsolved,
            ledger_write_failures,
        })
    }

    pub fn session_started(&self) {
        self.sessions_started.inc();
    }

    pub fn session_completed(&self, average_score: f64) {
        self.sessions_completed.inc();
        self.last_average_score.set(average_score);
    }

    pub fn guess_submitted(&self) {
        self.guesses_total.inc();
    }

    pub fn round_resolved(&self, solved: bool) {
        if solved {
            self.rounds_solved.inc();
        } else {
            self.rounds_unsolved.inc();
        }
    }

    pub fn ledger_write_failed(&self) {
        self.ledger_write_failures.inc();
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
