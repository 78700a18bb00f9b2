//! Puzzle set: which images are shown and what counts as a correct guess.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single image paired with the answer that solves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Image identifier, resolved by an [`ImageSource`](crate::imaging::ImageSource).
    pub image: String,
    /// Expected answer. Matched case-insensitively as a substring of the guess.
    pub answer: String,
}

impl Puzzle {
    pub fn new(image: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            answer: answer.into(),
        }
    }

    /// Returns true if `guess` solves this puzzle.
    ///
    /// The guess is trimmed and lower-cased; the lower-cased answer must
    /// appear somewhere inside it. Extra words around the answer are accepted.
    pub fn is_solved_by(&self, guess: &str) -> bool {
        let guess = guess.trim().to_lowercase();
        guess.contains(&self.answer.to_lowercase())
    }
}

/// Ordered, immutable collection of puzzles presented in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Puzzle>", into = "Vec<Puzzle>")]
pub struct PuzzleSet {
    puzzles: Vec<Puzzle>,
}

impl PuzzleSet {
    /// Builds a puzzle set, rejecting duplicate images and blank answers.
    ///
    /// An empty set is accepted here; starting a session with it is what fails.
    pub fn new(puzzles: Vec<Puzzle>) -> Result<Self, ConfigError> {
        let set = Self { puzzles };
        set.validate()?;
        Ok(set)
    }

    /// Validates the puzzle set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for puzzle in &self.puzzles {
            if !seen.insert(puzzle.image.as_str()) {
                return Err(ConfigError::DuplicatePuzzle(puzzle.image.clone()));
            }
            // A blank answer is a substring of every guess.
            if puzzle.answer.trim().is_empty() {
                return Err(ConfigError::BlankAnswer(puzzle.image.clone()));
            }
        }
        Ok(())
    }

    /// Image identifiers in presentation order.
    pub fn image_ids(&self) -> Vec<String> {
        self.puzzles.iter().map(|p| p.image.clone()).collect()
    }

    /// Looks up the puzzle for an image identifier.
    pub fn get(&self, image: &str) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| p.image == image)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Puzzle> {
        self.puzzles.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }
}

impl TryFrom<Vec<Puzzle>> for PuzzleSet {
    type Error = ConfigError;

    fn try_from(puzzles: Vec<Puzzle>) -> Result<Self, Self::Error> {
        Self::new(puzzles)
    }
}

impl From<PuzzleSet> for Vec<Puzzle> {
    fn from(set: PuzzleSet) -> Self {
        set.puzzles
    }
}

impl Default for PuzzleSet {
    fn default() -> Self {
        Self {
            puzzles: vec![
                Puzzle::new("pisica.jpg", "pisica"),
                Puzzle::new("cheie.jpg", "cheie"),
                Puzzle::new("mar.png", "mar"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_ignores_case_and_whitespace() {
        let puzzle = Puzzle::new("cat.jpg", "cat");
        assert!(puzzle.is_solved_by("CAT "));
        assert!(puzzle.is_solved_by("  a black cat"));
        assert!(!puzzle.is_solved_by("dog"));
        assert!(!puzzle.is_solved_by(""));
    }

    #[test]
    fn test_mixed_case_answer() {
        let puzzle = Puzzle::new("key.jpg", "Key");
        assert!(puzzle.is_solved_by("keychain"));
    }

    #[test]
    fn test_duplicate_images_rejected() {
        let result = PuzzleSet::new(vec![
            Puzzle::new("cat.jpg", "cat"),
            Puzzle::new("cat.jpg", "kitten"),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicatePuzzle(id)) if id == "cat.jpg"));
    }

    #[test]
    fn test_blank_answer_rejected() {
        let result = PuzzleSet::new(vec![Puzzle::new("cat.jpg", "  ")]);
        assert!(matches!(result, Err(ConfigError::BlankAnswer(_))));
    }

    #[test]
    fn test_order_preserved() {
        let set = PuzzleSet::default();
        assert_eq!(set.image_ids(), vec!["pisica.jpg", "cheie.jpg", "mar.png"]);
        assert_eq!(set.get("mar.png").map(|p| p.answer.as_str()), Some("mar"));
    }
}
