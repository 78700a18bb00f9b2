//! Blur schedule: the sequence of intensities shown for each attempt.

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Ordered blur intensities, strongest first.
///
/// Each attempt on an image moves one step down the schedule, so its
/// length is the number of guesses a player gets per image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct BlurSchedule {
    levels: Vec<u32>,
}

impl BlurSchedule {
    /// Builds a schedule. Levels must be non-empty, at least 1 and strictly decreasing.
    pub fn new(levels: Vec<u32>) -> Result<Self, ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        if levels.contains(&0) {
            return Err(ConfigError::InvalidIntensity);
        }
        if levels.windows(2).any(|w| w[0] <= w[1]) {
            return Err(ConfigError::ScheduleNotDecreasing(levels));
        }
        Ok(Self { levels })
    }

    /// Intensity at the given attempt index.
    #[inline]
    pub fn level(&self, index: usize) -> Option<u32> {
        self.levels.get(index).copied()
    }

    /// The weakest intensity, shown on the final attempt.
    #[inline]
    pub fn min_level(&self) -> u32 {
        // Non-empty and decreasing by construction.
        self.levels[self.levels.len() - 1]
    }

    /// Number of attempts per image.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn levels(&self) -> &[u32] {
        &self.levels
    }
}

impl Default for BlurSchedule {
    fn default() -> Self {
        Self {
            levels: vec![31, 21, 11, 5, 1],
        }
    }
}

impl TryFrom<Vec<u32>> for BlurSchedule {
    type Error = ConfigError;

    fn try_from(levels: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<BlurSchedule> for Vec<u32> {
    fn from(schedule: BlurSchedule) -> Self {
        schedule.levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let schedule = BlurSchedule::default();
        assert_eq!(schedule.len(), 5);
        assert_eq!(schedule.level(0), Some(31));
        assert_eq!(schedule.level(5), None);
        assert_eq!(schedule.min_level(), 1);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            BlurSchedule::new(vec![]),
            Err(ConfigError::EmptySchedule)
        ));
    }

    #[test]
    fn test_non_decreasing_rejected() {
        assert!(matches!(
            BlurSchedule::new(vec![11, 21, 1]),
            Err(ConfigError::ScheduleNotDecreasing(_))
        ));
        assert!(matches!(
            BlurSchedule::new(vec![5, 5, 1]),
            Err(ConfigError::ScheduleNotDecreasing(_))
        ));
    }

    #[test]
    fn test_zero_rejected() {
        assert!(matches!(
            BlurSchedule::new(vec![3, 0]),
            Err(ConfigError::InvalidIntensity)
        ));
    }
}
