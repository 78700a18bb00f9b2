//! Blur Recall Library
//!
//! A perceptual-recognition game. The player is shown an image that starts
//! heavily blurred and becomes clearer with every wrong guess; guessing the
//! subject earlier scores more points. Every finished round is appended to
//! a durable ledger which can later be aggregated into timing series.
//!
//! # Architecture
//!
//! ```text
//! imaging (source + blur) → game (controller, state, sessions) → ledger
//!                                                                  ↓
//!                                             aggregate (timing series) → renderer
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use blur_recall::{
//!     config::GameConfig,
//!     game::{GameController, GuessOutcome, RoundView},
//!     imaging::SyntheticSource,
//!     ledger::CsvLedger,
//! };
//!
//! let controller = GameController::new(
//!     GameConfig::default(),
//!     Arc::new(SyntheticSource::new()),
//!     Arc::new(CsvLedger::new("data/scores.csv")),
//! );
//!
//! let mut state = controller.start_session().unwrap();
//! while let RoundView::Playing(_prompt) = controller.begin_round(&mut state).unwrap() {
//!     // Show `_prompt.image` to the player and read a guess...
//!     match controller.submit_guess(&mut state, "pisica").unwrap() {
//!         GuessOutcome::Resolved { entry, .. } => println!("scored {}", entry.score),
//!         GuessOutcome::TryAgain { .. } => {}
//!     }
//! }
//!
//! let summary = controller.finalize_session(&mut state).unwrap();
//! println!("{:.1} ({})", summary.average_score, summary.interpretation);
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod config;
pub mod game;
pub mod imaging;
pub mod ledger;
pub mod metrics;

// Re-export commonly used types at crate root
pub use aggregate::{JsonReportWriter, Renderer, TimingReport};
pub use config::{BlurSchedule, FileConfig, GameConfig, Puzzle, PuzzleSet};
pub use game::{
    GameController, GameError, GameService, GuessOutcome, Interpretation, RoundState, RoundView,
    SessionSummary,
};
pub use imaging::{BlurProvider, DirectorySource, GaussianBlur, ImageSource, SyntheticSource};
pub use ledger::{CsvLedger, Ledger, LedgerEntry, MemoryLedger};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
