//! Lifecycle state machine.
//!
//! Pure transition functions: each takes the current record and returns the
//! next record plus the event the transition raises. Nothing here persists.
//!
//! # State Transition Diagram
//!
//! ```text
//! New ── outcome ──→ Learning ── score ≥ threshold ──→ Review ── streak = max ──→ Graduated ── archive() ──→ Archived
//!                     ↺ outcome                        ↺ success: streak+1
//!                                                      ↺ failure: streak=0
//!                    Learning ←──────── reset() ─────── Review, Graduated
//! ```

use crate::{
    LifecycleError, LifecycleEventType, MasteryResult, PracticeOutcome, ReviewScheduler,
    SchedulerConfig, ScoreSignal, ScoringEngine, Stage, Timestamp, Trigger, ValidationError,
    VocabularyRecord,
};

/// Result of a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Stage before the transition
    pub from: Stage,
    /// Record after the transition (version not yet bumped)
    pub record: VocabularyRecord,
    /// Event to publish once the record is persisted
    pub event: Option<LifecycleEventType>,
}

/// The transition table, parameterized by scheduler policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    scoring: ScoringEngine,
    scheduler: ReviewScheduler,
    max_review_streak: u32,
    reset_penalty: u8,
}

impl Lifecycle {
    /// Build the lifecycle from a validated configuration.
    pub fn new(config: &SchedulerConfig) -> MasteryResult<Self> {
        config.validate()?;
        Ok(Self {
            scoring: ScoringEngine::from_config(config),
            scheduler: ReviewScheduler::from_config(config)?,
            max_review_streak: config.max_review_streak,
            reset_penalty: config.reset_penalty,
        })
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    pub fn max_review_streak(&self) -> u32 {
        self.max_review_streak
    }

    /// Apply a practice outcome.
    ///
    /// Valid from New, Learning and Review. Score, error count, stage, streak
    /// and due time change together or not at all.
    pub fn apply_outcome(
        &self,
        current: &VocabularyRecord,
        outcome: &PracticeOutcome,
        now: Timestamp,
    ) -> MasteryResult<Transition> {
        if outcome.vocabulary_id != current.id {
            return Err(ValidationError::InvalidValue {
                field: "vocabulary_id".to_string(),
                reason: format!(
                    "outcome targets {} but record is {}",
                    outcome.vocabulary_id, current.id
                ),
            }
            .into());
        }
        if !current.stage.accepts_outcomes() {
            return Err(invalid_transition(current, Trigger::Outcome));
        }

        let delta = self.scoring.score(current, outcome);
        let mut next = current.clone();
        next.mastery_score = delta.apply(current.mastery_score);
        next.error_count = current.error_count.saturating_add(delta.error_count_delta);
        next.updated_at = now;

        let event = match current.stage {
            Stage::New => {
                next.stage = Stage::Learning;
                None
            }
            Stage::Learning => match delta.signal {
                Some(ScoreSignal::ReadyToGraduate) => {
                    self.enter_review(&mut next, 0, now)?;
                    Some(LifecycleEventType::GraduatedToReview)
                }
                _ => None,
            },
            Stage::Review if outcome.correct => {
                let streak = current.review_streak.saturating_add(1);
                if streak >= self.max_review_streak {
                    next.stage = Stage::Graduated;
                    next.review_streak = streak;
                    next.next_review_at = None;
                    Some(LifecycleEventType::Graduated)
                } else {
                    self.enter_review(&mut next, streak, now)?;
                    None
                }
            }
            Stage::Review => {
                self.enter_review(&mut next, 0, now)?;
                Some(LifecycleEventType::ReviewFailed)
            }
            Stage::Graduated | Stage::Archived => {
                return Err(invalid_transition(current, Trigger::Outcome));
            }
        };

        next.check_invariants()?;
        Ok(Transition {
            from: current.stage,
            record: next,
            event,
        })
    }

    /// Retire a graduated record. Only valid from Graduated.
    pub fn archive(&self, current: &VocabularyRecord, now: Timestamp) -> MasteryResult<Transition> {
        if current.stage != Stage::Graduated {
            return Err(invalid_transition(current, Trigger::Archive));
        }

        let mut next = current.clone();
        next.stage = Stage::Archived;
        next.next_review_at = None;
        next.updated_at = now;

        next.check_invariants()?;
        Ok(Transition {
            from: current.stage,
            record: next,
            event: Some(LifecycleEventType::Archived),
        })
    }

    /// Force a record back to Learning with a score penalty.
    ///
    /// Valid from Review and Graduated.
    pub fn reset(&self, current: &VocabularyRecord, now: Timestamp) -> MasteryResult<Transition> {
        if !matches!(current.stage, Stage::Review | Stage::Graduated) {
            return Err(invalid_transition(current, Trigger::Reset));
        }

        let mut next = current.clone();
        next.stage = Stage::Learning;
        next.mastery_score = current.mastery_score.saturating_sub(self.reset_penalty);
        next.review_streak = 0;
        next.next_review_at = None;
        next.updated_at = now;

        next.check_invariants()?;
        Ok(Transition {
            from: current.stage,
            record: next,
            event: Some(LifecycleEventType::Reset),
        })
    }

    fn enter_review(
        &self,
        record: &mut VocabularyRecord,
        streak: u32,
        now: Timestamp,
    ) -> MasteryResult<()> {
        record.next_review_at = self.scheduler.compute_next_review(Stage::Review, streak, now)?;
        record.stage = Stage::Review;
        record.review_streak = streak;
        Ok(())
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        let config = SchedulerConfig::default();
        Self {
            scoring: ScoringEngine::from_config(&config),
            scheduler: ReviewScheduler::default(),
            max_review_streak: config.max_review_streak,
            reset_penalty: config.reset_penalty,
        }
    }
}

fn invalid_transition(current: &VocabularyRecord, trigger: Trigger) -> crate::MasteryError {
    LifecycleError::InvalidStateTransition {
        id: current.id,
        from: current.stage,
        trigger,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MasteryError, UserId};
    use chrono::{Duration, Utc};

    fn record(stage: Stage, score: u8) -> VocabularyRecord {
        let now = Utc::now();
        let mut record = VocabularyRecord::new(UserId::now_v7(), "apple", now).unwrap();
        record.stage = stage;
        record.mastery_score = score;
        if stage == Stage::Review {
            record.next_review_at = Some(now);
        }
        record
    }

    #[test]
    fn test_first_outcome_moves_new_to_learning() {
        let lifecycle = Lifecycle::default();
        let current = record(Stage::New, 0);
        let now = Utc::now();

        let t = lifecycle
            .apply_outcome(&current, &PracticeOutcome::correct(current.id), now)
            .unwrap();
        assert_eq!(t.from, Stage::New);
        assert_eq!(t.record.stage, Stage::Learning);
        assert_eq!(t.record.mastery_score, 10);
        assert_eq!(t.record.updated_at, now);
        assert_eq!(t.event, None);
    }

    #[test]
    fn test_first_outcome_wrong_still_enters_learning() {
        let lifecycle = Lifecycle::default();
        let current = record(Stage::New, 0);

        let t = lifecycle
            .apply_outcome(&current, &PracticeOutcome::incorrect(current.id), Utc::now())
            .unwrap();
        assert_eq!(t.record.stage, Stage::Learning);
        assert_eq!(t.record.mastery_score, 0);
        assert_eq!(t.record.error_count, 1);
    }

    #[test]
    fn test_learning_failure_stays_learning() {
        let lifecycle = Lifecycle::default();
        let current = record(Stage::Learning, 50);

        let t = lifecycle
            .apply_outcome(&current, &PracticeOutcome::incorrect(current.id), Utc::now())
            .unwrap();
        assert_eq!(t.record.stage, Stage::Learning);
        assert_eq!(t.record.mastery_score, 30);
        assert_eq!(t.record.error_count, 1);
        assert_eq!(t.event, None);
    }

    #[test]
    fn test_learning_graduates_to_review() {
        let lifecycle = Lifecycle::default();
        let current = record(Stage::Learning, 85);
        let now = Utc::now();

        let t = lifecycle
            .apply_outcome(&current, &PracticeOutcome::correct(current.id), now)
            .unwrap();
        assert_eq!(t.record.stage, Stage::Review);
        assert_eq!(t.record.mastery_score, 95);
        assert_eq!(t.record.review_streak, 0);
        assert_eq!(t.record.next_review_at, Some(now + Duration::days(1)));
        assert_eq!(t.event, Some(LifecycleEventType::GraduatedToReview));
    }

    #[test]
    fn test_review_success_extends_interval() {
        let lifecycle = Lifecycle::default();
        let mut current = record(Stage::Review, 95);
        current.review_streak = 1;
        let now = Utc::now();

        let t = lifecycle
            .apply_outcome(&current, &PracticeOutcome::correct(current.id), now)
            .unwrap();
        assert_eq!(t.record.stage, Stage::Review);
        assert_eq!(t.record.review_streak, 2);
        assert_eq!(t.record.next_review_at, Some(now + Duration::days(7)));
        assert_eq!(t.event, None);
    }

    #[test]
    fn test_review_success_at_max_streak_graduates() {
        let lifecycle = Lifecycle::default();
        let mut current = record(Stage::Review, 100);
        current.review_streak = 4;

        let t = lifecycle
            .apply_outcome(&current, &PracticeOutcome::correct(current.id), Utc::now())
            .unwrap();
        assert_eq!(t.record.stage, Stage::Graduated);
        assert_eq!(t.record.review_streak, 5);
        assert_eq!(t.record.next_review_at, None);
        assert_eq!(t.event, Some(LifecycleEventType::Graduated));
    }

    #[test]
    fn test_review_failure_resets_streak() {
        let lifecycle = Lifecycle::default();
        let mut current = record(Stage::Review, 95);
        current.review_streak = 3;
        let now = Utc::now();

        let t = lifecycle
            .apply_outcome(&current, &PracticeOutcome::incorrect(current.id), now)
            .unwrap();
        assert_eq!(t.record.stage, Stage::Review);
        assert_eq!(t.record.review_streak, 0);
        assert_eq!(t.record.mastery_score, 75);
        assert_eq!(t.record.error_count, 1);
        assert_eq!(t.record.next_review_at, Some(now + Duration::days(1)));
        assert_eq!(t.event, Some(LifecycleEventType::ReviewFailed));
    }

    #[test]
    fn test_outcome_rejected_after_graduation() {
        let lifecycle = Lifecycle::default();
        for stage in [Stage::Graduated, Stage::Archived] {
            let current = record(stage, 100);
            let err = lifecycle
                .apply_outcome(&current, &PracticeOutcome::correct(current.id), Utc::now())
                .unwrap_err();
            assert_eq!(
                err,
                MasteryError::Lifecycle(LifecycleError::InvalidStateTransition {
                    id: current.id,
                    from: stage,
                    trigger: Trigger::Outcome,
                })
            );
        }
    }

    #[test]
    fn test_outcome_for_other_record_is_rejected() {
        let lifecycle = Lifecycle::default();
        let current = record(Stage::Learning, 10);
        let other = record(Stage::Learning, 10);
        let err = lifecycle
            .apply_outcome(&current, &PracticeOutcome::correct(other.id), Utc::now())
            .unwrap_err();
        assert!(matches!(err, MasteryError::Validation(_)));
    }

    #[test]
    fn test_archive_only_from_graduated() {
        let lifecycle = Lifecycle::default();
        let graduated = record(Stage::Graduated, 100);
        let t = lifecycle.archive(&graduated, Utc::now()).unwrap();
        assert_eq!(t.record.stage, Stage::Archived);
        assert_eq!(t.event, Some(LifecycleEventType::Archived));

        for stage in [Stage::New, Stage::Learning, Stage::Review, Stage::Archived] {
            let current = record(stage, 50);
            let err = lifecycle.archive(&current, Utc::now()).unwrap_err();
            assert!(err.is_invalid_transition());
        }
    }

    #[test]
    fn test_reset_from_review_and_graduated() {
        let lifecycle = Lifecycle::default();
        for stage in [Stage::Review, Stage::Graduated] {
            let mut current = record(stage, 100);
            current.review_streak = 3;
            let t = lifecycle.reset(&current, Utc::now()).unwrap();
            assert_eq!(t.record.stage, Stage::Learning);
            assert_eq!(t.record.mastery_score, 70);
            assert_eq!(t.record.review_streak, 0);
            assert_eq!(t.record.next_review_at, None);
            assert_eq!(t.event, Some(LifecycleEventType::Reset));
        }
    }

    #[test]
    fn test_reset_penalty_floors_at_zero() {
        let lifecycle = Lifecycle::default();
        let current = record(Stage::Review, 10);
        let t = lifecycle.reset(&current, Utc::now()).unwrap();
        assert_eq!(t.record.mastery_score, 0);
    }

    #[test]
    fn test_reset_rejected_elsewhere() {
        let lifecycle = Lifecycle::default();
        for stage in [Stage::New, Stage::Learning, Stage::Archived] {
            let current = record(stage, 50);
            assert!(lifecycle.reset(&current, Utc::now()).unwrap_err().is_invalid_transition());
        }
    }

    #[test]
    fn test_custom_config_short_ladder() {
        let config = SchedulerConfig {
            max_review_streak: 1,
            review_intervals_secs: vec![3600],
            ..SchedulerConfig::default()
        };
        let lifecycle = Lifecycle::new(&config).unwrap();
        assert_eq!(lifecycle.max_review_streak(), 1);
        assert_eq!(lifecycle.scoring().graduation_threshold(), config.graduation_threshold);
        assert_eq!(lifecycle.scheduler().len(), 1);

        let current = record(Stage::Review, 90);
        let t = lifecycle
            .apply_outcome(&current, &PracticeOutcome::correct(current.id), Utc::now())
            .unwrap();
        assert_eq!(t.record.stage, Stage::Graduated);
    }

    #[test]
    fn test_due_time_overflow_rejects_outcome() {
        let lifecycle = Lifecycle::default();
        let now = chrono::DateTime::<Utc>::MAX_UTC - Duration::hours(1);

        let learning = record(Stage::Learning, 85);
        let err = lifecycle
            .apply_outcome(&learning, &PracticeOutcome::correct(learning.id), now)
            .unwrap_err();
        assert!(matches!(err, MasteryError::Validation(_)));

        let review = record(Stage::Review, 90);
        for correct in [true, false] {
            let outcome = PracticeOutcome {
                vocabulary_id: review.id,
                correct,
                attempt_index: 0,
            };
            assert!(lifecycle.apply_outcome(&review, &outcome, now).is_err());
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = SchedulerConfig {
            max_review_streak: 0,
            ..SchedulerConfig::default()
        };
        assert!(Lifecycle::new(&config).is_err());
    }
}
