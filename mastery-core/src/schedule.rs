//! Spaced-repetition review scheduling.
//!
//! The ladder is a fixed, ordered table indexed by review streak. Streaks past
//! the end of the table reuse the last interval, so growth is bounded.

use crate::{ConfigError, MasteryResult, SchedulerConfig, Stage, Timestamp, ValidationError};
use chrono::Duration;

/// Longest interval the ladder accepts (100 years).
const MAX_INTERVAL_SECS: u64 = 100 * 365 * 86_400;

/// Computes review due times from a bounded interval table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewScheduler {
    intervals: Vec<Duration>,
}

impl ReviewScheduler {
    /// Build a scheduler from an interval ladder in seconds.
    ///
    /// The ladder must be non-empty, positive and non-decreasing.
    pub fn new(intervals_secs: &[u64]) -> MasteryResult<Self> {
        if intervals_secs.is_empty() {
            return Err(ladder_error(intervals_secs, "at least one review interval is required"));
        }
        if intervals_secs.windows(2).any(|w| w[1] < w[0]) {
            return Err(ladder_error(intervals_secs, "review intervals must be non-decreasing"));
        }

        let mut intervals = Vec::with_capacity(intervals_secs.len());
        for &secs in intervals_secs {
            if secs == 0 || secs > MAX_INTERVAL_SECS {
                return Err(ladder_error(
                    intervals_secs,
                    "review intervals must be positive and at most 100 years",
                ));
            }
            intervals.push(Duration::seconds(secs as i64));
        }

        Ok(Self { intervals })
    }

    pub fn from_config(config: &SchedulerConfig) -> MasteryResult<Self> {
        Self::new(&config.review_intervals_secs)
    }

    /// Interval for a streak, clamped to the last entry of the table.
    pub fn interval_for(&self, review_streak: u32) -> Duration {
        let last = self.intervals.len() - 1;
        let index = usize::try_from(review_streak).map_or(last, |i| i.min(last));
        self.intervals[index]
    }

    /// Shortest interval, used when a review fails.
    pub fn first_interval(&self) -> Duration {
        self.intervals[0]
    }

    /// Number of entries in the ladder.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Next due time for a record in `stage` with `review_streak`.
    ///
    /// Only `Review` carries a due time; every other stage yields `None`.
    /// Reads no clock: the same inputs always give the same answer. Fails
    /// when `now` plus the interval falls outside the representable range.
    pub fn compute_next_review(
        &self,
        stage: Stage,
        review_streak: u32,
        now: Timestamp,
    ) -> MasteryResult<Option<Timestamp>> {
        match stage {
            Stage::Review => {
                let interval = self.interval_for(review_streak);
                now.checked_add_signed(interval).map(Some).ok_or_else(|| {
                    ValidationError::InvalidValue {
                        field: "now".to_string(),
                        reason: format!(
                            "{} plus {}s overflows the timestamp range",
                            now,
                            interval.num_seconds()
                        ),
                    }
                    .into()
                })
            }
            Stage::New | Stage::Learning | Stage::Graduated | Stage::Archived => Ok(None),
        }
    }
}

impl Default for ReviewScheduler {
    fn default() -> Self {
        let intervals = crate::DEFAULT_REVIEW_INTERVALS_SECS
            .iter()
            .map(|secs| Duration::seconds(*secs as i64))
            .collect();
        Self { intervals }
    }
}

fn ladder_error(intervals_secs: &[u64], reason: &str) -> crate::MasteryError {
    ConfigError::InvalidValue {
        field: "review_intervals_secs".to_string(),
        value: format!("{:?}", intervals_secs),
        reason: reason.to_string(),
    }
    .into()
}
