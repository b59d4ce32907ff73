//! Lifecycle coordinator.
//!
//! The only component allowed to change a record's stage. Each mutating
//! operation reads the record, computes the transition with
//! [`mastery_core::Lifecycle`], writes it with a compare-and-swap on the
//! version it read, and publishes the resulting event only after the write
//! commits. Conflicts are surfaced, never retried here.

use crate::sink::NotificationSink;
use mastery_core::{
    normalize_word, Lifecycle, LifecycleEvent, LifecycleEventType, MasteryError, MasteryResult,
    PracticeOutcome, SchedulerConfig, Stage, StorageError, Timestamp, Transition, UserId,
    VocabularyId, VocabularyRecord,
};
use mastery_storage::{RecordQuery, VocabularyRepository};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates scoring, scheduling and persistence of vocabulary records.
#[derive(Clone)]
pub struct LifecycleCoordinator {
    repository: Arc<dyn VocabularyRepository>,
    sink: Arc<dyn NotificationSink>,
    lifecycle: Lifecycle,
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCoordinator")
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl LifecycleCoordinator {
    /// Create a coordinator. Fails if the configuration is invalid.
    pub fn new(
        repository: Arc<dyn VocabularyRepository>,
        sink: Arc<dyn NotificationSink>,
        config: &SchedulerConfig,
    ) -> MasteryResult<Self> {
        Ok(Self {
            repository,
            sink,
            lifecycle: Lifecycle::new(config)?,
        })
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    // ========================================================================
    // PRACTICE
    // ========================================================================

    /// Return the learner's record for `word`, creating a `New` one if needed.
    pub fn enroll(
        &self,
        user_id: UserId,
        word: &str,
        now: Timestamp,
    ) -> MasteryResult<VocabularyRecord> {
        let word = normalize_word(word)?;
        if let Some(existing) = self.repository.find_by_word(user_id, &word)? {
            return Ok(existing);
        }

        let record = VocabularyRecord::new(user_id, &word, now)?;
        match self.repository.insert(&record) {
            Ok(()) => {
                debug!(vocabulary_id = %record.id, user_id = %user_id, word = %word, "Enrolled word");
                Ok(record)
            }
            // Lost an enrollment race: the winner's record is the answer.
            Err(err @ MasteryError::Storage(StorageError::AlreadyExists { .. })) => {
                self.repository.find_by_word(user_id, &word)?.ok_or(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Get a record by ID.
    pub fn get(&self, id: VocabularyId) -> MasteryResult<VocabularyRecord> {
        self.repository
            .get(id)?
            .ok_or_else(|| StorageError::NotFound { id }.into())
    }

    /// Apply one practice outcome and return the updated record.
    pub fn record_outcome(
        &self,
        id: VocabularyId,
        outcome: &PracticeOutcome,
        now: Timestamp,
    ) -> MasteryResult<VocabularyRecord> {
        let current = self.get(id)?;
        let transition = self
            .lifecycle
            .apply_outcome(&current, outcome, now)
            .inspect_err(|err| {
                warn!(vocabulary_id = %id, stage = %current.stage, error = %err, "Rejected outcome");
            })?;

        debug!(
            vocabulary_id = %id,
            correct = outcome.correct,
            attempt_index = outcome.attempt_index,
            "Recording outcome"
        );
        self.commit(&current, transition, now)
    }

    /// Review-stage records due at `as_of`, earliest first, ties by id.
    ///
    /// Each call re-queries the repository, so repeating it is safe.
    pub fn list_due_for_review(
        &self,
        user_id: UserId,
        as_of: Timestamp,
    ) -> MasteryResult<Vec<VocabularyRecord>> {
        let query = RecordQuery::for_user(user_id)
            .with_stage(Stage::Review)
            .due_before(as_of);
        let mut due = self.repository.query(&query)?;
        due.sort_by(|a, b| {
            a.next_review_at
                .cmp(&b.next_review_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(due)
    }

    /// Every non-archived record of a learner, oldest first.
    pub fn list_active(&self, user_id: UserId) -> MasteryResult<Vec<VocabularyRecord>> {
        let mut active = self.repository.list_by_user(user_id)?;
        active.retain(|r| r.stage.is_active());
        active.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(active)
    }

    /// Publish a `review-due` event for every due record, in due order.
    ///
    /// Meant for the external cron that drives reminders. Records are not
    /// modified, so calling it twice publishes the same events twice.
    pub fn dispatch_due_reviews(
        &self,
        user_id: UserId,
        as_of: Timestamp,
    ) -> MasteryResult<Vec<LifecycleEvent>> {
        let events: Vec<LifecycleEvent> = self
            .list_due_for_review(user_id, as_of)?
            .iter()
            .map(|record| LifecycleEvent::new(record, LifecycleEventType::ReviewDue, as_of))
            .collect();

        for event in &events {
            self.sink.publish(event);
        }
        if !events.is_empty() {
            info!(user_id = %user_id, count = events.len(), "Dispatched due reviews");
        }
        Ok(events)
    }

    // ========================================================================
    // ADMINISTRATION
    // ========================================================================

    /// Retire a graduated record.
    pub fn archive(&self, id: VocabularyId, now: Timestamp) -> MasteryResult<VocabularyRecord> {
        let current = self.get(id)?;
        let transition = self.lifecycle.archive(&current, now).inspect_err(|err| {
            warn!(vocabulary_id = %id, stage = %current.stage, error = %err, "Rejected archive");
        })?;
        self.commit(&current, transition, now)
    }

    /// Force a Review or Graduated record back to Learning.
    pub fn reset(&self, id: VocabularyId, now: Timestamp) -> MasteryResult<VocabularyRecord> {
        let current = self.get(id)?;
        let transition = self.lifecycle.reset(&current, now).inspect_err(|err| {
            warn!(vocabulary_id = %id, stage = %current.stage, error = %err, "Rejected reset");
        })?;
        self.commit(&current, transition, now)
    }

    /// Physically remove a record. Only ever called on explicit request.
    pub fn delete(&self, id: VocabularyId, now: Timestamp) -> MasteryResult<VocabularyRecord> {
        let removed = self.repository.delete(id)?;
        info!(vocabulary_id = %id, user_id = %removed.user_id, word = %removed.word, "Deleted record");
        self.sink
            .publish(&LifecycleEvent::new(&removed, LifecycleEventType::Deleted, now));
        Ok(removed)
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn commit(
        &self,
        current: &VocabularyRecord,
        transition: Transition,
        now: Timestamp,
    ) -> MasteryResult<VocabularyRecord> {
        let stored = self
            .repository
            .update(&transition.record, current.version)
            .inspect_err(|err| {
                if err.is_conflict() {
                    warn!(vocabulary_id = %current.id, version = current.version, "Concurrent write detected");
                }
            })?;

        debug!(
            vocabulary_id = %stored.id,
            from = %transition.from,
            to = %stored.stage,
            score = stored.mastery_score,
            streak = stored.review_streak,
            version = stored.version,
            "Applied transition"
        );

        if let Some(event_type) = transition.event {
            if transition.from != stored.stage {
                info!(vocabulary_id = %stored.id, from = %transition.from, to = %stored.stage, "Stage changed");
            }
            self.sink
                .publish(&LifecycleEvent::new(&stored, event_type, now));
        }

        Ok(stored)
    }
}
