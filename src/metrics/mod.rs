//! Prometheus metrics for game activity.
//!
//! # Metrics Exposed
//!
//! ## Sessions
//! - `blur_recall_sessions_started_total` - Sessions started
//! - `blur_recall_sessions_completed_total` - Sessions played to the end
//! - `blur_recall_last_average_score` - Average score of the last finished session
//!
//! ## Rounds
//! - `blur_recall_guesses_total` - Guesses submitted
//! - `blur_recall_rounds_solved_total` - Rounds ended by a correct guess
//! - `blur_recall_rounds_unsolved_total` - Rounds that ran out of attempts
//!
//! ## Storage
//! - `blur_recall_ledger_write_failures_total` - Failed ledger appends
//!
//! With the `metrics` feature, [`MetricsServer`] exposes these at
//! `/metrics`, plus `/health` and the ledger timing series at `/timings`.
//!
//! # Example
//!
//! ```no_run
//! use blur_recall::metrics::GameMetrics;
//!
//! let metrics = GameMetrics::new().expect("Failed to create registry");
//! metrics.session_started();
//! println!("{}", metrics.encode().unwrap());
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{GameMetrics, MetricsError};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
