//! Ledger entry types.

use crate::game::Interpretation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text used for fields that have no value.
pub const NOT_APPLICABLE: &str = "n/a";

/// Blur intensity at which a round was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurLevel {
    /// Solved while this intensity was shown.
    Level(u32),
    /// Attempts ran out without a correct guess.
    NotApplicable,
}

impl BlurLevel {
    /// Returns the intensity, if the round was solved.
    pub fn intensity(&self) -> Option<u32> {
        match self {
            BlurLevel::Level(level) => Some(*level),
            BlurLevel::NotApplicable => None,
        }
    }
}

impl fmt::Display for BlurLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlurLevel::Level(level) => write!(f, "{}", level),
            BlurLevel::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl FromStr for BlurLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == NOT_APPLICABLE {
            return Ok(BlurLevel::NotApplicable);
        }
        s.parse::<u32>()
            .map(BlurLevel::Level)
            .map_err(|_| format!("invalid blur level: {:?}", s))
    }
}

/// One completed round. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Puzzle image identifier.
    pub image: String,
    /// Intensity reached, or `n/a` if unsolved.
    pub blur_level: BlurLevel,
    /// Seconds from first display to resolution; `None` if not recorded.
    pub elapsed_secs: Option<f64>,
    /// The guess that resolved the round.
    pub guess: String,
    /// Points awarded (0 if unsolved).
    pub score: u32,
    /// Qualitative label for the score.
    pub interpretation: Interpretation,
}

impl LedgerEntry {
    /// Entry for a correctly guessed image.
    pub fn solved(
        image: impl Into<String>,
        intensity: u32,
        elapsed_secs: f64,
        guess: impl Into<String>,
        score: u32,
    ) -> Self {
        Self {
            image: image.into(),
            blur_level: BlurLevel::Level(intensity),
            elapsed_secs: Some(elapsed_secs),
            guess: guess.into(),
            score,
            interpretation: Interpretation::from_score(score as f64),
        }
    }

    /// Entry for an image whose attempts ran out.
    pub fn unsolved(image: impl Into<String>, elapsed_secs: f64, guess: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            blur_level: BlurLevel::NotApplicable,
            elapsed_secs: Some(elapsed_secs),
            guess: guess.into(),
            score: 0,
            interpretation: Interpretation::NoCorrectAnswer,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.blur_level != BlurLevel::NotApplicable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blur_level_text() {
        assert_eq!(BlurLevel::Level(21).to_string(), "21");
        assert_eq!(BlurLevel::NotApplicable.to_string(), "n/a");
        assert_eq!("n/a".parse::<BlurLevel>(), Ok(BlurLevel::NotApplicable));
        assert_eq!(" 5".parse::<BlurLevel>(), Ok(BlurLevel::Level(5)));
        assert!("five".parse::<BlurLevel>().is_err());
    }

    #[test]
    fn test_level_ordering() {
        assert!(BlurLevel::Level(1) < BlurLevel::Level(31));
    }

    #[test]
    fn test_constructors() {
        let solved = LedgerEntry::solved("cat.jpg", 11, 3.5, "cat", 60);
        assert!(solved.is_solved());
        assert_eq!(solved.interpretation, Interpretation::Moderate);

        let unsolved = LedgerEntry::unsolved("cat.jpg", 9.0, "dog");
        assert!(!unsolved.is_solved());
        assert_eq!(unsolved.score, 0);
        assert_eq!(unsolved.interpretation, Interpretation::NoCorrectAnswer);
    }
}
