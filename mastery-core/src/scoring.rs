//! Mastery scoring.
//!
//! Turns a single practice outcome into a score delta plus an optional signal
//! for the lifecycle. Pure: the engine never mutates or persists anything.

use crate::{PracticeOutcome, SchedulerConfig, Stage, VocabularyRecord, MAX_MASTERY_SCORE};
use serde::{Deserialize, Serialize};

/// Lifecycle hint produced alongside a score delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScoreSignal {
    /// A Learning word reached the graduation threshold
    ReadyToGraduate,
    /// A review attempt was answered wrongly
    ReviewFailed,
}

/// Change to apply to a record for one outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDelta {
    /// Already clamped so that `score + mastery_delta` stays in 0..=100
    pub mastery_delta: i16,
    pub error_count_delta: u32,
    pub signal: Option<ScoreSignal>,
}

impl ScoreDelta {
    /// Apply the delta to a score. The result never leaves 0..=100.
    pub fn apply(&self, score: u8) -> u8 {
        let next = i16::from(score) + self.mastery_delta;
        next.clamp(0, i16::from(MAX_MASTERY_SCORE)) as u8
    }
}

/// Computes score deltas from practice outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringEngine {
    success_delta: u8,
    failure_penalty: u8,
    graduation_threshold: u8,
}

impl ScoringEngine {
    pub fn new(success_delta: u8, failure_penalty: u8, graduation_threshold: u8) -> Self {
        Self {
            success_delta,
            failure_penalty,
            graduation_threshold,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(
            config.success_delta,
            config.failure_penalty,
            config.graduation_threshold,
        )
    }

    pub fn graduation_threshold(&self) -> u8 {
        self.graduation_threshold
    }

    /// Score one outcome against the record's current state.
    pub fn score(&self, current: &VocabularyRecord, outcome: &PracticeOutcome) -> ScoreDelta {
        let score = current.mastery_score.min(MAX_MASTERY_SCORE);

        if outcome.correct {
            let gain = self.success_delta.min(MAX_MASTERY_SCORE - score);
            let signal = (current.stage == Stage::Learning
                && score + gain >= self.graduation_threshold)
                .then_some(ScoreSignal::ReadyToGraduate);
            ScoreDelta {
                mastery_delta: i16::from(gain),
                error_count_delta: 0,
                signal,
            }
        } else {
            let loss = self.failure_penalty.min(score);
            let signal = (current.stage == Stage::Review).then_some(ScoreSignal::ReviewFailed);
            ScoreDelta {
                mastery_delta: -i16::from(loss),
                error_count_delta: 1,
                signal,
            }
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;
    use chrono::Utc;

    fn record(stage: Stage, score: u8) -> VocabularyRecord {
        let mut record = VocabularyRecord::new(UserId::now_v7(), "apple", Utc::now()).unwrap();
        record.stage = stage;
        record.mastery_score = score;
        record
    }

    #[test]
    fn test_success_adds_delta() {
        let engine = ScoringEngine::default();
        let current = record(Stage::New, 0);
        let delta = engine.score(&current, &PracticeOutcome::correct(current.id));
        assert_eq!(delta.mastery_delta, 10);
        assert_eq!(delta.error_count_delta, 0);
        assert_eq!(delta.signal, None);
        assert_eq!(delta.apply(0), 10);
    }

    #[test]
    fn test_success_clamps_at_ceiling() {
        let engine = ScoringEngine::default();
        let current = record(Stage::Review, 96);
        let delta = engine.score(&current, &PracticeOutcome::correct(current.id));
        assert_eq!(delta.mastery_delta, 4);
        assert_eq!(delta.apply(96), 100);

        let current = record(Stage::Review, 100);
        let delta = engine.score(&current, &PracticeOutcome::correct(current.id));
        assert_eq!(delta.mastery_delta, 0);
    }

    #[test]
    fn test_learning_crossing_threshold_signals_graduation() {
        let engine = ScoringEngine::default();
        let current = record(Stage::Learning, 85);
        let delta = engine.score(&current, &PracticeOutcome::correct(current.id));
        assert_eq!(delta.apply(85), 95);
        assert_eq!(delta.signal, Some(ScoreSignal::ReadyToGraduate));
    }

    #[test]
    fn test_learning_below_threshold_has_no_signal() {
        let engine = ScoringEngine::default();
        let current = record(Stage::Learning, 70);
        let delta = engine.score(&current, &PracticeOutcome::correct(current.id));
        assert_eq!(delta.signal, None);
    }

    #[test]
    fn test_new_stage_never_signals_graduation() {
        let engine = ScoringEngine::new(10, 20, 5);
        let current = record(Stage::New, 0);
        let delta = engine.score(&current, &PracticeOutcome::correct(current.id));
        assert_eq!(delta.signal, None);
    }

    #[test]
    fn test_failure_floors_at_zero() {
        let engine = ScoringEngine::default();
        let current = record(Stage::Learning, 15);
        let delta = engine.score(&current, &PracticeOutcome::incorrect(current.id));
        assert_eq!(delta.mastery_delta, -15);
        assert_eq!(delta.error_count_delta, 1);
        assert_eq!(delta.apply(15), 0);
        assert_eq!(delta.signal, None);
    }

    #[test]
    fn test_review_failure_signals() {
        let engine = ScoringEngine::default();
        let current = record(Stage::Review, 95);
        let delta = engine.score(&current, &PracticeOutcome::incorrect(current.id));
        assert_eq!(delta.mastery_delta, -20);
        assert_eq!(delta.signal, Some(ScoreSignal::ReviewFailed));
    }
}
