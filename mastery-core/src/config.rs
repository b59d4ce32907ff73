//! Scheduler configuration
//!
//! Every numeric policy knob of the scoring and review ladder lives here so
//! product tuning never touches the state machine.

use crate::{ConfigError, MasteryResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound of a mastery score.
pub const MAX_MASTERY_SCORE: u8 = 100;

const DAY_SECS: u64 = 86_400;

/// Default review ladder: 1, 3, 7, 14 and 30 days.
pub const DEFAULT_REVIEW_INTERVALS_SECS: [u64; 5] =
    [DAY_SECS, 3 * DAY_SECS, 7 * DAY_SECS, 14 * DAY_SECS, 30 * DAY_SECS];

/// Policy for scoring outcomes and scheduling reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Score gained on a correct answer
    pub success_delta: u8,
    /// Score lost on a wrong answer
    pub failure_penalty: u8,
    /// Score at which a Learning word moves to Review
    pub graduation_threshold: u8,
    /// Successful reviews needed to graduate
    pub max_review_streak: u32,
    /// Score lost when a word is forced back to Learning
    pub reset_penalty: u8,
    /// Review ladder in seconds, indexed by review streak
    pub review_intervals_secs: Vec<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            success_delta: 10,
            failure_penalty: 20,
            graduation_threshold: 90,
            max_review_streak: 5,
            reset_penalty: 30,
            review_intervals_secs: DEFAULT_REVIEW_INTERVALS_SECS.to_vec(),
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> MasteryResult<Self> {
        let config: SchedulerConfig = toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: &Path) -> MasteryResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - success_delta > 0
    /// - graduation_threshold in 1..=100
    /// - max_review_streak > 0
    /// - review_intervals_secs accepted by [`crate::ReviewScheduler::new`]
    pub fn validate(&self) -> MasteryResult<()> {
        if self.success_delta == 0 {
            return Err(invalid(
                "success_delta",
                self.success_delta,
                "success_delta must be greater than 0",
            ));
        }

        if self.graduation_threshold == 0 || self.graduation_threshold > MAX_MASTERY_SCORE {
            return Err(invalid(
                "graduation_threshold",
                self.graduation_threshold,
                "graduation_threshold must be between 1 and 100",
            ));
        }

        if self.max_review_streak == 0 {
            return Err(invalid(
                "max_review_streak",
                self.max_review_streak,
                "max_review_streak must be greater than 0",
            ));
        }

        crate::ReviewScheduler::new(&self.review_intervals_secs)?;

        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> crate::MasteryError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
