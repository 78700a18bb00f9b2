//! Round state machine.
//!
//! The controller owns no session data. Each operation takes the session's
//! [`RoundState`] and either applies a complete transition or leaves it
//! untouched, so a failed ledger append can be retried without double
//! counting.

use super::clock::{elapsed_secs, Clock, SystemClock};
use super::scoring::{score_for_attempt, Interpretation};
use super::state::RoundState;
use super::GameError;
use crate::aggregate::TimingReport;
use crate::config::GameConfig;
use crate::imaging::{BlurProvider, GaussianBlur, ImageSource};
use crate::ledger::{Ledger, LedgerEntry};
use crate::metrics::GameMetrics;
use image::DynamicImage;
use std::sync::Arc;

/// The image to show for the current attempt.
#[derive(Debug, Clone)]
pub struct RoundPrompt {
    pub image_id: String,
    /// 1-based round number within the session.
    pub round: usize,
    pub total_rounds: usize,
    /// 1-based attempt number within the round.
    pub attempt: usize,
    pub max_attempts: usize,
    /// Blur intensity applied to `image`.
    pub blur_level: u32,
    pub image: DynamicImage,
}

/// Result of [`GameController::begin_round`].
#[derive(Debug, Clone)]
pub enum RoundView {
    /// A guess is expected for this prompt.
    Playing(RoundPrompt),
    /// Every image is resolved; the caller should finalize the session.
    SessionComplete,
}

/// Result of [`GameController::submit_guess`].
#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    /// The round ended and was recorded in the ledger.
    Resolved {
        entry: LedgerEntry,
        /// True if that was the last image of the session.
        session_complete: bool,
    },
    /// Wrong guess; the same image will be shown less blurred.
    TryAgain {
        next_blur_level: u32,
        attempts_left: usize,
    },
}

/// Final result of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub rounds: usize,
    pub total_score: u32,
    pub average_score: f64,
    pub interpretation: Interpretation,
    /// Timing series over the whole ledger, for rendering.
    pub report: TimingReport,
}

/// Drives sessions through the round state machine.
pub struct GameController {
    config: GameConfig,
    source: Arc<dyn ImageSource>,
    blur: Arc<dyn BlurProvider>,
    ledger: Arc<dyn Ledger>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<GameMetrics>>,
}

impl GameController {
    /// Creates a controller with Gaussian blur and the system clock.
    pub fn new(
        config: GameConfig,
        source: Arc<dyn ImageSource>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        let blur = Arc::new(GaussianBlur::with_floor(config.schedule.min_level()));
        Self {
            config,
            source,
            blur,
            ledger,
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    pub fn with_blur(mut self, blur: Arc<dyn BlurProvider>) -> Self {
        self.blur = blur;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<GameMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Creates the state for a new session over the full puzzle set.
    pub fn start_session(&self) -> Result<RoundState, GameError> {
        if self.config.puzzles.is_empty() {
            return Err(GameError::EmptyPuzzleSet);
        }

        let state = RoundState::new(self.config.puzzles.image_ids());
        if let Some(metrics) = &self.metrics {
            metrics.session_started();
        }
        tracing::info!(images = state.images.len(), "Session started");
        Ok(state)
    }

    /// Shows the current image at the current blur level.
    ///
    /// Starts the round timer on first display. Calling again before a guess
    /// returns the same prompt without touching the timer.
    pub fn begin_round(&self, state: &mut RoundState) -> Result<RoundView, GameError> {
        let Some(image_id) = state.current_image().map(str::to_owned) else {
            tracing::debug!("No images left, session complete");
            return Ok(RoundView::SessionComplete);
        };

        let blur_index = if state.round_start_time.is_some() {
            state.blur_index
        } else {
            0
        };
        let blur_level = self
            .config
            .schedule
            .level(blur_index)
            .ok_or(GameError::InvalidSessionState("blur index beyond schedule"))?;

        // Load before mutating so a missing image leaves the state untouched.
        let image = self.source.load(&image_id)?;

        if state.start_round(self.clock.now()) {
            tracing::info!(
                image = %image_id,
                round = state.current_index + 1,
                "Round started"
            );
        }

        Ok(RoundView::Playing(RoundPrompt {
            round: state.current_index + 1,
            total_rounds: state.images.len(),
            attempt: blur_index + 1,
            max_attempts: self.config.schedule.len(),
            blur_level,
            image: self.blur.blur(&image, blur_level),
            image_id,
        }))
    }

    /// Scores a guess for the round awaiting one.
    pub fn submit_guess(
        &self,
        state: &mut RoundState,
        guess: &str,
    ) -> Result<GuessOutcome, GameError> {
        let (Some(started), Some(image_id)) = (state.round_start_time, state.current_image()) else {
            return Err(GameError::InvalidSessionState("no round is awaiting a guess"));
        };
        let image_id = image_id.to_owned();
        let puzzle = self
            .config
            .puzzles
            .get(&image_id)
            .ok_or(GameError::InvalidSessionState("image is not in the puzzle set"))?;
        let blur_level = self
            .config
            .schedule
            .level(state.blur_index)
            .ok_or(GameError::InvalidSessionState("blur index beyond schedule"))?;

        let elapsed = elapsed_secs(started, self.clock.now());
        let guess = guess.trim();

        if puzzle.is_solved_by(guess) {
            let score = score_for_attempt(state.blur_index);
            let entry = LedgerEntry::solved(&image_id, blur_level, elapsed, guess, score);
            self.record(&entry)?;
            state.advance(score);
            self.count_guess();

            tracing::info!(
                image = %image_id,
                blur_level,
                score,
                elapsed_secs = elapsed,
                "Round solved"
            );
            return Ok(self.resolved(state, entry));
        }

        let next_index = state.blur_index + 1;
        match self.config.schedule.level(next_index) {
            Some(next_blur_level) => {
                state.blur_index = next_index;
                self.count_guess();
                tracing::debug!(
                    image = %image_id,
                    attempt = next_index,
                    next_blur_level,
                    "Incorrect guess"
                );
                Ok(GuessOutcome::TryAgain {
                    next_blur_level,
                    attempts_left: self.config.schedule.len() - next_index,
                })
            }
            None => {
                let entry = LedgerEntry::unsolved(&image_id, elapsed, guess);
                self.record(&entry)?;
                state.advance(0);
                self.count_guess();

                tracing::info!(
                    image = %image_id,
                    elapsed_secs = elapsed,
                    "Round ended without a correct answer"
                );
                Ok(self.resolved(state, entry))
            }
        }
    }

    /// Summarises a completed session and aggregates the ledger.
    ///
    /// May be called again; the summary is recomputed but the session is
    /// only counted as completed once.
    pub fn finalize_session(&self, state: &mut RoundState) -> Result<SessionSummary, GameError> {
        if state.images.is_empty() {
            return Err(GameError::EmptyPuzzleSet);
        }
        if !state.is_complete() {
            return Err(GameError::InvalidSessionState("session still has rounds to play"));
        }

        let rounds = state.images.len();
        let average_score = f64::from(state.cumulative_score) / rounds as f64;
        let interpretation = Interpretation::from_score(average_score);
        let report =
            TimingReport::from_ledger(self.ledger.as_ref()).map_err(GameError::Aggregation)?;

        if !state.finalized {
            state.finalized = true;
            if let Some(metrics) = &self.metrics {
                metrics.session_completed(average_score);
            }
        }
        tracing::info!(
            rounds,
            total_score = state.cumulative_score,
            average_score,
            interpretation = %interpretation,
            "Session finished"
        );

        Ok(SessionSummary {
            rounds,
            total_score: state.cumulative_score,
            average_score,
            interpretation,
            report,
        })
    }

    fn record(&self, entry: &LedgerEntry) -> Result<(), GameError> {
        self.ledger.append(entry).map_err(|e| {
            tracing::warn!(
                image = %entry.image,
                error = %e,
                "Ledger append failed, round not advanced"
            );
            if let Some(metrics) = &self.metrics {
                metrics.ledger_write_failed();
            }
            GameError::StorageWriteFailure(e)
        })
    }

    /// Counts a guess once its transition has been applied.
    fn count_guess(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.guess_submitted();
        }
    }

    fn resolved(&self, state: &RoundState, entry: LedgerEntry) -> GuessOutcome {
        if let Some(metrics) = &self.metrics {
            metrics.round_resolved(entry.is_solved());
        }
        GuessOutcome::Resolved {
            entry,
            session_complete: state.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlurSchedule, Puzzle, PuzzleSet};
    use crate::game::clock::ManualClock;
    use crate::game::state::Phase;
    use crate::imaging::SyntheticSource;
    use crate::ledger::{BlurLevel, LedgerError, MemoryLedger};
    use chrono::Duration;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Ledger that can be switched into a failing mode.
    #[derive(Default)]
    struct FlakyLedger {
        inner: MemoryLedger,
        failing: AtomicBool,
    }

    impl Ledger for FlakyLedger {
        fn append(&self, entry: &LedgerEntry) -> Result<(), LedgerError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(LedgerError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.append(entry)
        }

        fn read_all(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
            self.inner.read_all()
        }
    }

    fn config(puzzles: Vec<Puzzle>) -> GameConfig {
        GameConfig::new(PuzzleSet::new(puzzles).unwrap(), BlurSchedule::default())
    }

    fn cat_config() -> GameConfig {
        config(vec![Puzzle::new("cat.jpg", "cat")])
    }

    fn controller(
        config: GameConfig,
        ledger: Arc<dyn Ledger>,
    ) -> (GameController, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let controller = GameController::new(config, Arc::new(SyntheticSource::new()), ledger)
            .with_clock(clock.clone());
        (controller, clock)
    }

    fn prompt(view: RoundView) -> RoundPrompt {
        match view {
            RoundView::Playing(prompt) => prompt,
            RoundView::SessionComplete => panic!("expected a prompt"),
        }
    }

    fn resolved(outcome: GuessOutcome) -> (LedgerEntry, bool) {
        match outcome {
            GuessOutcome::Resolved {
                entry,
                session_complete,
            } => (entry, session_complete),
            other => panic!("expected resolution, got {:?}", other),
        }
    }

    #[test]
    fn test_three_misses_then_correct() {
        let ledger = Arc::new(MemoryLedger::new());
        let (game, clock) = controller(cat_config(), ledger.clone());
        let mut state = game.start_session().unwrap();

        for expected_level in [31, 21, 11] {
            let p = prompt(game.begin_round(&mut state).unwrap());
            assert_eq!(p.blur_level, expected_level);
            clock.advance(Duration::seconds(1));
            assert!(matches!(
                game.submit_guess(&mut state, "dog").unwrap(),
                GuessOutcome::TryAgain { .. }
            ));
        }

        let p = prompt(game.begin_round(&mut state).unwrap());
        assert_eq!(p.blur_level, 5);
        assert_eq!(p.attempt, 4);

        let (entry, complete) = resolved(game.submit_guess(&mut state, "cat").unwrap());
        assert!(complete);
        assert_eq!(entry.blur_level, BlurLevel::Level(5));
        assert_eq!(entry.score, 40);
        assert_eq!(entry.interpretation, Interpretation::Moderate);
        assert_eq!(entry.elapsed_secs, Some(3.0));

        assert!(matches!(
            game.begin_round(&mut state).unwrap(),
            RoundView::SessionComplete
        ));
        let summary = game.finalize_session(&mut state).unwrap();
        assert_eq!(summary.average_score, 40.0);
        assert_eq!(summary.interpretation, Interpretation::Moderate);
        assert_eq!(summary.report.per_blur_level.len(), 1);
    }

    #[test]
    fn test_first_attempt_with_case_and_whitespace() {
        let ledger = Arc::new(MemoryLedger::new());
        let (game, _clock) = controller(cat_config(), ledger.clone());
        let mut state = game.start_session().unwrap();

        game.begin_round(&mut state).unwrap();
        let (entry, _) = resolved(game.submit_guess(&mut state, "CAT ").unwrap());

        assert_eq!(entry.blur_level, BlurLevel::Level(31));
        assert_eq!(entry.score, 100);
        assert_eq!(entry.interpretation, Interpretation::Excellent);
        assert_eq!(entry.guess, "CAT");
    }

    #[test]
    fn test_exhausted_attempts() {
        let ledger = Arc::new(MemoryLedger::new());
        let (game, _clock) = controller(cat_config(), ledger.clone());
        let mut state = game.start_session().unwrap();

        game.begin_round(&mut state).unwrap();
        for _ in 0..4 {
            assert!(matches!(
                game.submit_guess(&mut state, "").unwrap(),
                GuessOutcome::TryAgain { .. }
            ));
        }
        let (entry, complete) = resolved(game.submit_guess(&mut state, "bird").unwrap());

        assert!(complete);
        assert_eq!(entry.blur_level, BlurLevel::NotApplicable);
        assert_eq!(entry.score, 0);
        assert_eq!(entry.interpretation, Interpretation::NoCorrectAnswer);
        assert_eq!(state.current_index, 1);

        // Resubmitting after resolution must not append again.
        assert!(matches!(
            game.submit_guess(&mut state, "bird"),
            Err(GameError::InvalidSessionState(_))
        ));
        assert_eq!(ledger.len(), 1);

        let summary = game.finalize_session(&mut state).unwrap();
        assert_eq!(summary.average_score, 0.0);
        assert_eq!(summary.interpretation, Interpretation::Significant);
    }

    #[test]
    fn test_begin_round_is_idempotent() {
        let (game, clock) = controller(cat_config(), Arc::new(MemoryLedger::new()));
        let mut state = game.start_session().unwrap();

        game.begin_round(&mut state).unwrap();
        let started = state.round_start_time;
        game.submit_guess(&mut state, "dog").unwrap();

        clock.advance(Duration::seconds(10));
        let p = prompt(game.begin_round(&mut state).unwrap());
        let p2 = prompt(game.begin_round(&mut state).unwrap());

        assert_eq!(state.round_start_time, started);
        assert_eq!(state.blur_index, 1);
        assert_eq!(p.blur_level, 21);
        assert_eq!(p2.blur_level, 21);
    }

    #[test]
    fn test_guess_before_round_rejected() {
        let (game, _clock) = controller(cat_config(), Arc::new(MemoryLedger::new()));
        let mut state = game.start_session().unwrap();
        assert_eq!(state.phase(), Phase::Pending);

        assert!(matches!(
            game.submit_guess(&mut state, "cat"),
            Err(GameError::InvalidSessionState(_))
        ));
    }

    #[test]
    fn test_empty_puzzle_set_rejected() {
        let (game, _clock) = controller(config(vec![]), Arc::new(MemoryLedger::new()));
        assert!(matches!(game.start_session(), Err(GameError::EmptyPuzzleSet)));
    }

    #[test]
    fn test_finalize_before_complete_rejected() {
        let (game, _clock) = controller(cat_config(), Arc::new(MemoryLedger::new()));
        let mut state = game.start_session().unwrap();
        assert!(matches!(
            game.finalize_session(&mut state),
            Err(GameError::InvalidSessionState(_))
        ));
    }

    #[test]
    fn test_storage_failure_leaves_state_untouched() {
        let ledger = Arc::new(FlakyLedger::default());
        let (game, _clock) = controller(cat_config(), ledger.clone());
        let mut state = game.start_session().unwrap();
        game.begin_round(&mut state).unwrap();
        game.submit_guess(&mut state, "dog").unwrap();

        ledger.failing.store(true, Ordering::SeqCst);
        let before = state.clone();
        assert!(matches!(
            game.submit_guess(&mut state, "cat"),
            Err(GameError::StorageWriteFailure(_))
        ));
        assert_eq!(state, before);

        // Retrying the identical guess completes the round exactly once.
        ledger.failing.store(false, Ordering::SeqCst);
        let (entry, _) = resolved(game.submit_guess(&mut state, "cat").unwrap());
        assert_eq!(entry.score, 80);
        assert_eq!(state.cumulative_score, 80);
        assert_eq!(ledger.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_cumulative_score_matches_ledger() {
        let ledger = Arc::new(MemoryLedger::new());
        let game_config = config(vec![
            Puzzle::new("cat.jpg", "cat"),
            Puzzle::new("key.jpg", "key"),
            Puzzle::new("apple.png", "apple"),
        ]);
        let (game, _clock) = controller(game_config, ledger.clone());
        let mut state = game.start_session().unwrap();

        let scripts: [&[&str]; 3] = [
            &["cat"],
            &["lock", "door", "key"],
            &["x", "y", "z", "w", "v"],
        ];
        for script in scripts {
            game.begin_round(&mut state).unwrap();
            for guess in script {
                game.submit_guess(&mut state, guess).unwrap();
            }
        }

        assert!(state.is_complete());
        let total: u32 = ledger.read_all().unwrap().iter().map(|e| e.score).sum();
        assert_eq!(total, 160);
        assert_eq!(state.cumulative_score, total);

        let summary = game.finalize_session(&mut state).unwrap();
        assert!((summary.average_score - 160.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.interpretation, Interpretation::Moderate);
        assert_eq!(summary.report.per_entry.len(), 3);
    }

    #[test]
    fn test_metrics_recorded() {
        let metrics = Arc::new(GameMetrics::new().unwrap());
        let (game, _clock) = controller(cat_config(), Arc::new(MemoryLedger::new()));
        let game = game.with_metrics(metrics.clone());

        let mut state = game.start_session().unwrap();
        game.begin_round(&mut state).unwrap();
        game.submit_guess(&mut state, "dog").unwrap();
        game.submit_guess(&mut state, "cat").unwrap();
        game.finalize_session(&mut state).unwrap();

        let output = metrics.encode().unwrap();
        assert!(output.contains("blur_recall_guesses_total 2"));
        assert!(output.contains("blur_recall_rounds_solved_total 1"));
        assert!(output.contains("blur_recall_sessions_completed_total 1"));
    }

    #[test]
    fn test_metrics_not_double_counted() {
        let metrics = Arc::new(GameMetrics::new().unwrap());
        let ledger = Arc::new(FlakyLedger::default());
        let (game, _clock) = controller(cat_config(), ledger.clone());
        let game = game.with_metrics(metrics.clone());

        let mut state = game.start_session().unwrap();
        game.begin_round(&mut state).unwrap();

        ledger.failing.store(true, Ordering::SeqCst);
        assert!(game.submit_guess(&mut state, "cat").is_err());
        ledger.failing.store(false, Ordering::SeqCst);
        game.submit_guess(&mut state, "cat").unwrap();

        let first = game.finalize_session(&mut state).unwrap();
        let second = game.finalize_session(&mut state).unwrap();
        assert_eq!(first, second);
        assert!(state.finalized);

        let output = metrics.encode().unwrap();
        assert!(output.contains("blur_recall_guesses_total 1"));
        assert!(output.contains("blur_recall_ledger_write_failures_total 1"));
        assert!(output.contains("blur_recall_sessions_completed_total 1"));
    }
}
