//! Round sequencing, scoring and session handling.
//!
//! A session walks every puzzle in order. For each image the controller
//! shows progressively less blurred versions until the player guesses
//! correctly or the blur schedule runs out:
//!
//! ```text
//! AWAITING_GUESS(image, i) ──wrong, i+1 < n──▶ AWAITING_GUESS(image, i+1)
//!        │
//!        └─correct / out of attempts─▶ ROUND_RESOLVED ─▶ next image or SESSION_COMPLETE
//! ```

mod clock;
mod controller;
mod scoring;
mod session;
mod state;

pub use clock::{elapsed_secs, Clock, ManualClock, SystemClock};
pub use controller::{GameController, GuessOutcome, RoundPrompt, RoundView, SessionSummary};
pub use scoring::{score_for_attempt, Interpretation, MAX_SCORE, PENALTY_PER_ATTEMPT};
pub use session::{GameService, InMemorySessionStore, SessionId, SessionStore};
pub use state::{Phase, RoundState};

use crate::imaging::SourceError;
use crate::ledger::LedgerError;
use thiserror::Error;

/// Errors returned by game operations.
#[derive(Debug, Error)]
pub enum GameError {
    /// The round could not be recorded; it was not advanced and may be retried.
    #[error("failed to record round: {0}")]
    StorageWriteFailure(#[source] LedgerError),
    /// An operation was called out of order.
    #[error("invalid session state: {0}")]
    InvalidSessionState(&'static str),
    #[error("puzzle set is empty")]
    EmptyPuzzleSet,
    #[error("puzzle image unavailable: {0}")]
    ImageUnavailable(#[from] SourceError),
    #[error("unknown session: {0}")]
    UnknownSession(SessionId),
    #[error("failed to read ledger for aggregation: {0}")]
    Aggregation(#[source] LedgerError),
}
