//! Mastery Test Utilities
//!
//! Shared test infrastructure for the mastery workspace:
//! - Proptest generators for records, outcomes and configurations
//! - Fixtures for records in every stage
//! - Assertions for mastery-specific error and invariant checks

// Re-export mock storage from its source crate
pub use mastery_storage::{MockStorage, RecordQuery, VocabularyRepository};

// Re-export core types for convenience
pub use mastery_core::{
    LifecycleEvent, LifecycleEventType, MasteryError, MasteryResult, PracticeOutcome,
    SchedulerConfig, Stage, StorageError, Timestamp, UserId, VocabularyId, VocabularyRecord,
    EntityIdType, DEFAULT_REVIEW_INTERVALS_SECS, MAX_MASTERY_SCORE,
};

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating mastery entity types.

    use super::*;
    use proptest::prelude::*;

    // === Identity Type Generators ===

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_vocabulary_id() -> impl Strategy<Value = VocabularyId> {
        arb_uuid().prop_map(VocabularyId::new)
    }

    pub fn arb_user_id() -> impl Strategy<Value = UserId> {
        arb_uuid().prop_map(UserId::new)
    }

    /// Generate a Timestamp between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    // === Enum Generators ===

    pub fn arb_stage() -> impl Strategy<Value = Stage> {
        prop_oneof![
            Just(Stage::New),
            Just(Stage::Learning),
            Just(Stage::Review),
            Just(Stage::Graduated),
            Just(Stage::Archived),
        ]
    }

    // === Entity Generators ===

    /// Generate an already-normalized word.
    pub fn arb_word() -> impl Strategy<Value = String> {
        "[a-z]{1,16}"
    }

    /// Generate an outcome for a given record.
    pub fn arb_practice_outcome(vocabulary_id: VocabularyId) -> impl Strategy<Value = PracticeOutcome> {
        (any::<bool>(), 0u32..10).prop_map(move |(correct, attempt_index)| PracticeOutcome {
            vocabulary_id,
            correct,
            attempt_index,
        })
    }

    /// Generate a sequence of correct/incorrect answers.
    pub fn arb_answers(max_len: usize) -> impl Strategy<Value = Vec<bool>> {
        prop::collection::vec(any::<bool>(), 0..=max_len)
    }

    /// Generate a record that satisfies every record invariant.
    pub fn arb_vocabulary_record() -> impl Strategy<Value = VocabularyRecord> {
        (
            arb_vocabulary_id(),
            arb_user_id(),
            arb_word(),
            0u8..=MAX_MASTERY_SCORE,
            0u32..50,
            arb_stage(),
            0u32..5,
            arb_timestamp(),
            1i64..(30 * 86_400),
            0u64..10,
        )
            .prop_map(
                |(id, user_id, word, mastery_score, error_count, stage, streak, created_at, due_in, version)| {
                    let next_review_at =
                        (stage == Stage::Review).then(|| created_at + Duration::seconds(due_in));
                    let review_streak = match stage {
                        Stage::Review | Stage::Graduated => streak,
                        _ => 0,
                    };
                    VocabularyRecord {
                        id,
                        user_id,
                        word,
                        mastery_score,
                        error_count,
                        stage,
                        review_streak,
                        next_review_at,
                        version,
                        created_at,
                        updated_at: created_at,
                    }
                },
            )
    }

    /// Generate a configuration that passes validation.
    pub fn arb_valid_config() -> impl Strategy<Value = SchedulerConfig> {
        (
            1u8..=50,
            0u8..=50,
            1u8..=MAX_MASTERY_SCORE,
            1u32..=8,
            0u8..=60,
            prop::collection::vec(1u64..(90 * 86_400), 1..6),
        )
            .prop_map(
                |(success_delta, failure_penalty, graduation_threshold, max_review_streak, reset_penalty, mut ladder)| {
                    ladder.sort_unstable();
                    SchedulerConfig {
                        success_delta,
                        failure_penalty,
                        graduation_threshold,
                        max_review_streak,
                        reset_penalty,
                        review_intervals_secs: ladder,
                    }
                },
            )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common testing scenarios.

    use super::*;

    /// A fixed instant, so schedules are reproducible.
    pub fn fixed_now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }

    /// A fresh `New` record.
    pub fn new_record(user_id: UserId, word: &str) -> VocabularyRecord {
        let now = fixed_now();
        VocabularyRecord {
            id: VocabularyId::now_v7(),
            user_id,
            word: word.trim().to_lowercase(),
            mastery_score: 0,
            error_count: 0,
            stage: Stage::New,
            review_streak: 0,
            next_review_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// A `Learning` record with the given score.
    pub fn learning_record(user_id: UserId, word: &str, mastery_score: u8) -> VocabularyRecord {
        VocabularyRecord {
            stage: Stage::Learning,
            mastery_score,
            ..new_record(user_id, word)
        }
    }

    /// A `Review` record with the given streak, due at `due`.
    pub fn review_record(
        user_id: UserId,
        word: &str,
        review_streak: u32,
        due: Timestamp,
    ) -> VocabularyRecord {
        VocabularyRecord {
            stage: Stage::Review,
            mastery_score: 90,
            review_streak,
            next_review_at: Some(due),
            ..new_record(user_id, word)
        }
    }

    /// A `Graduated` record.
    pub fn graduated_record(user_id: UserId, word: &str) -> VocabularyRecord {
        VocabularyRecord {
            stage: Stage::Graduated,
            mastery_score: MAX_MASTERY_SCORE,
            review_streak: 5,
            ..new_record(user_id, word)
        }
    }

    /// A storage pre-filled with `records`.
    pub fn seeded_storage(records: &[VocabularyRecord]) -> MockStorage {
        let storage = MockStorage::new();
        for record in records {
            if let Err(e) = storage.insert(record) {
                panic!("Failed to seed record {}: {:?}", record.id, e);
            }
        }
        storage
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertion functions for mastery-specific validation.

    use super::*;

    /// Assert that a MasteryResult is Ok.
    #[track_caller]
    pub fn assert_ok<T: std::fmt::Debug>(result: &MasteryResult<T>) {
        assert!(result.is_ok(), "Expected Ok, got Err: {:?}", result);
    }

    /// Assert that a MasteryResult is Err.
    #[track_caller]
    pub fn assert_err<T: std::fmt::Debug>(result: &MasteryResult<T>) {
        assert!(result.is_err(), "Expected Err, got Ok: {:?}", result);
    }

    /// Assert that a MasteryResult is a NotFound error for `id`.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &MasteryResult<T>, id: VocabularyId) {
        match result {
            Err(MasteryError::Storage(StorageError::NotFound { id: missing })) => {
                assert_eq!(*missing, id, "Wrong id in NotFound error");
            }
            other => panic!("Expected NotFound error for {}, got: {:?}", id, other),
        }
    }

    /// Assert that a MasteryResult is an InvalidStateTransition error.
    #[track_caller]
    pub fn assert_invalid_transition<T: std::fmt::Debug>(result: &MasteryResult<T>) {
        match result {
            Err(e) if e.is_invalid_transition() => {}
            other => panic!("Expected InvalidStateTransition error, got: {:?}", other),
        }
    }

    /// Assert that a MasteryResult is a PersistenceConflict error.
    #[track_caller]
    pub fn assert_conflict<T: std::fmt::Debug>(result: &MasteryResult<T>) {
        match result {
            Err(e) if e.is_conflict() => {}
            other => panic!("Expected PersistenceConflict error, got: {:?}", other),
        }
    }

    /// Assert that a MasteryResult is a Validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &MasteryResult<T>) {
        match result {
            Err(MasteryError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a record satisfies every record invariant.
    #[track_caller]
    pub fn assert_invariants(record: &VocabularyRecord) {
        if let Err(e) = record.check_invariants() {
            panic!("Record {} violates invariants: {:?}", record.id, e);
        }
    }

    /// Assert that a record is in the expected stage.
    #[track_caller]
    pub fn assert_stage(record: &VocabularyRecord, expected: Stage) {
        assert_eq!(
            record.stage, expected,
            "Stage mismatch for {}: expected {}, got {}",
            record.word, expected, record.stage
        );
    }
}
