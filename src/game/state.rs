//! Per-session round state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a session is in the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The current image has not been shown yet.
    Pending,
    /// The current image is shown and a guess is expected.
    AwaitingGuess,
    /// Every image has been resolved.
    Complete,
}

/// Progress of one player session.
///
/// Owned exclusively by its session. Serialisable so an external store can
/// persist it between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Puzzle identifiers in presentation order.
    pub images: Vec<String>,
    /// Cursor into `images`; equal to its length once the session is complete.
    pub current_index: usize,
    /// Cursor into the blur schedule for the current image.
    pub blur_index: usize,
    /// Set when the current image is first shown, cleared when its round ends.
    pub round_start_time: Option<DateTime<Utc>>,
    /// Sum of all per-round scores so far.
    pub cumulative_score: u32,
    /// Set once the session has been summarised.
    #[serde(default)]
    pub finalized: bool,
}

impl RoundState {
    /// Fresh state for a session over the given images.
    pub fn new(images: Vec<String>) -> Self {
        Self {
            images,
            current_index: 0,
            blur_index: 0,
            round_start_time: None,
            cumulative_score: 0,
            finalized: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.is_complete() {
            Phase::Complete
        } else if self.round_start_time.is_some() {
            Phase::AwaitingGuess
        } else {
            Phase::Pending
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.current_index >= self.images.len()
    }

    /// The image currently being played, if any.
    pub fn current_image(&self) -> Option<&str> {
        self.images.get(self.current_index).map(String::as_str)
    }

    /// Starts the round timer if it is not already running.
    ///
    /// Returns true if a new round was started.
    pub(crate) fn start_round(&mut self, now: DateTime<Utc>) -> bool {
        if self.round_start_time.is_some() {
            return false;
        }
        self.round_start_time = Some(now);
        self.blur_index = 0;
        true
    }

    /// Ends the current round and moves to the next image.
    pub(crate) fn advance(&mut self, score: u32) {
        self.cumulative_score += score;
        self.current_index += 1;
        self.blur_index = 0;
        self.round_start_time = None;
    }

    /// Number of images resolved so far.
    pub fn rounds_played(&self) -> usize {
        self.current_index.min(self.images.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn state() -> RoundState {
        RoundState::new(vec!["a.png".into(), "b.png".into()])
    }

    #[test]
    fn test_phases() {
        let mut s = state();
        assert_eq!(s.phase(), Phase::Pending);

        s.start_round(Utc::now());
        assert_eq!(s.phase(), Phase::AwaitingGuess);

        s.advance(100);
        assert_eq!(s.phase(), Phase::Pending);
        assert_eq!(s.current_image(), Some("b.png"));

        s.start_round(Utc::now());
        s.advance(40);
        assert_eq!(s.phase(), Phase::Complete);
        assert_eq!(s.current_image(), None);
        assert_eq!(s.cumulative_score, 140);
        assert_eq!(s.rounds_played(), 2);
    }

    #[test]
    fn test_start_round_keeps_running_timer() {
        let mut s = state();
        let first = Utc::now();
        assert!(s.start_round(first));
        s.blur_index = 2;

        assert!(!s.start_round(first + Duration::seconds(5)));
        assert_eq!(s.round_start_time, Some(first));
        assert_eq!(s.blur_index, 2);
    }

    #[test]
    fn test_finalized_defaults_when_absent() {
        let json = r#"{"images":["a.png"],"current_index":1,"blur_index":0,
            "round_start_time":null,"cumulative_score":100}"#;
        let s: RoundState = serde_json::from_str(json).unwrap();
        assert!(!s.finalized);
        assert!(s.is_complete());
    }

    #[test]
    fn test_serde_round_trip() {
        let mut s = state();
        s.start_round(Utc::now());
        s.blur_index = 1;

        let json = serde_json::to_string(&s).unwrap();
        let back: RoundState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
