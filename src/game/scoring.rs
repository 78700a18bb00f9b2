//! Scoring rules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Points for a correct guess on the first attempt.
pub const MAX_SCORE: u32 = 100;

/// Points lost per extra attempt.
pub const PENALTY_PER_ATTEMPT: u32 = 20;

/// Score for a correct guess at the given blur index.
///
/// Never negative; non-increasing in `blur_index`.
pub fn score_for_attempt(blur_index: usize) -> u32 {
    let penalty = u32::try_from(blur_index)
        .unwrap_or(u32::MAX)
        .saturating_mul(PENALTY_PER_ATTEMPT);
    MAX_SCORE.saturating_sub(penalty)
}

/// Qualitative reading of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interpretation {
    /// Score of 90 or more.
    Excellent,
    /// Score of 70 or more.
    Good,
    /// Score of 40 or more.
    Moderate,
    /// Anything lower.
    Significant,
    /// The round ended without a correct guess.
    NoCorrectAnswer,
}

impl Interpretation {
    /// Bands a score, evaluated top-down with inclusive lower bounds.
    ///
    /// Takes `f64` so session averages can be banded as well.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Interpretation::Excellent
        } else if score >= 70.0 {
            Interpretation::Good
        } else if score >= 40.0 {
            Interpretation::Moderate
        } else {
            Interpretation::Significant
        }
    }

    /// Human-readable label, as stored in the ledger.
    pub fn label(&self) -> &'static str {
        match self {
            Interpretation::Excellent => "Excellent recognition",
            Interpretation::Good => "Good recognition",
            Interpretation::Moderate => "Moderate delay",
            Interpretation::Significant => "Significant difficulty",
            Interpretation::NoCorrectAnswer => "No correct answer",
        }
    }

    const ALL: [Interpretation; 5] = [
        Interpretation::Excellent,
        Interpretation::Good,
        Interpretation::Moderate,
        Interpretation::Significant,
        Interpretation::NoCorrectAnswer,
    ];
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interpretation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|i| i.label() == s)
            .ok_or_else(|| format!("unknown interpretation: {:?}", s))
    }
}
