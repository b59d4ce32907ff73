//! Property-Based Tests for the Vocabulary Lifecycle
//!
//! - Score bounds: any sequence of outcomes keeps the score in 0..=100.
//! - Closure: only edges of the transition table are reachable, and every
//!   rejected request leaves the stored record byte-for-byte unchanged.
//! - Due list: exactly the Review records due at `as_of`, ordered by due time.

use chrono::Duration;
use mastery_lifecycle::{CollectingSink, LifecycleCoordinator};
use mastery_test_utils::fixtures::*;
use mastery_test_utils::generators::*;
use mastery_test_utils::*;
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// HELPERS
// ============================================================================

fn coordinator_with(
    records: &[VocabularyRecord],
    config: &SchedulerConfig,
) -> (LifecycleCoordinator, Arc<CollectingSink>) {
    let storage = Arc::new(seeded_storage(records));
    let sink = Arc::new(CollectingSink::new());
    let coordinator = LifecycleCoordinator::new(storage, sink.clone(), config)
        .expect("generated config is valid");
    (coordinator, sink)
}

#[derive(Debug, Clone, Copy)]
enum Request {
    Outcome(PracticeOutcome),
    Archive,
    Reset,
}

/// A stored record paired with a request aimed at it.
fn arb_record_and_request() -> impl Strategy<Value = (VocabularyRecord, Request)> {
    arb_vocabulary_record().prop_flat_map(|record| {
        let request = prop_oneof![
            arb_practice_outcome(record.id).prop_map(Request::Outcome),
            Just(Request::Archive),
            Just(Request::Reset),
        ];
        (Just(record), request)
    })
}

/// Stage edges each request may take.
fn allowed(from: Stage, request: Request) -> &'static [Stage] {
    match (from, request) {
        (Stage::New, Request::Outcome(_)) => &[Stage::Learning],
        (Stage::Learning, Request::Outcome(_)) => &[Stage::Learning, Stage::Review],
        (Stage::Review, Request::Outcome(_)) => &[Stage::Review, Stage::Graduated],
        (Stage::Graduated, Request::Archive) => &[Stage::Archived],
        (Stage::Review | Stage::Graduated, Request::Reset) => &[Stage::Learning],
        _ => &[],
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_score_stays_in_bounds(
        config in arb_valid_config(),
        answers in arb_answers(60),
        step_hours in 1i64..(24 * 40),
    ) {
        let (coordinator, _) = coordinator_with(&[], &config);
        let mut now = fixed_now();
        let record = coordinator.enroll(UserId::now_v7(), "apple", now).unwrap();
        let id = record.id;

        for correct in answers {
            let outcome = PracticeOutcome { vocabulary_id: id, correct, attempt_index: 0 };
            match coordinator.record_outcome(id, &outcome, now) {
                Ok(updated) => {
                    prop_assert!(updated.mastery_score <= MAX_MASTERY_SCORE);
                    prop_assert!(updated.check_invariants().is_ok());
                }
                Err(e) => {
                    // Only a graduated word refuses further practice.
                    prop_assert!(e.is_invalid_transition());
                    prop_assert_eq!(coordinator.get(id).unwrap().stage, Stage::Graduated);
                }
            }
            now += Duration::hours(step_hours);
        }
    }

    #[test]
    fn prop_only_table_transitions_are_reachable(
        (record, request) in arb_record_and_request(),
    ) {
        let (coordinator, sink) = coordinator_with(&[record.clone()], &SchedulerConfig::default());
        let now = record.created_at + Duration::hours(1);
        let id = record.id;

        let result = match request {
            Request::Outcome(outcome) => coordinator.record_outcome(id, &outcome, now),
            Request::Archive => coordinator.archive(id, now),
            Request::Reset => coordinator.reset(id, now),
        };

        let permitted = allowed(record.stage, request);
        match result {
            Ok(updated) => {
                prop_assert!(
                    permitted.contains(&updated.stage),
                    "{:?} took {} to {}", request, record.stage, updated.stage
                );
                prop_assert_eq!(updated.version, record.version + 1);
                prop_assert!(updated.check_invariants().is_ok());
            }
            Err(e) => {
                prop_assert!(permitted.is_empty(), "{:?} from {} failed: {:?}", request, record.stage, e);
                prop_assert!(e.is_invalid_transition());
                prop_assert_eq!(coordinator.get(id).unwrap(), record);
                prop_assert!(sink.is_empty());
            }
        }
    }

    #[test]
    fn prop_due_list_is_exact_and_sorted(
        user_id in arb_user_id(),
        records in prop::collection::vec(arb_vocabulary_record(), 0..20),
        as_of_offset_hours in -(24i64 * 30)..(24 * 30),
    ) {
        let records: Vec<VocabularyRecord> = records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                // Half the records belong to the learner under test.
                if i % 2 == 0 {
                    r.user_id = user_id;
                }
                r.word = format!("word{}", i);
                r
            })
            .collect();
        let (coordinator, _) = coordinator_with(&records, &SchedulerConfig::default());
        let as_of = fixed_now() + Duration::hours(as_of_offset_hours);

        let due = coordinator.list_due_for_review(user_id, as_of).unwrap();

        let mut expected: Vec<&VocabularyRecord> = records
            .iter()
            .filter(|r| r.user_id == user_id && r.stage == Stage::Review)
            .filter(|r| r.next_review_at.is_some_and(|at| at <= as_of))
            .collect();
        expected.sort_by(|a, b| a.next_review_at.cmp(&b.next_review_at).then_with(|| a.id.cmp(&b.id)));

        let due_ids: Vec<_> = due.iter().map(|r| r.id).collect();
        let expected_ids: Vec<_> = expected.iter().map(|r| r.id).collect();
        prop_assert_eq!(due_ids, expected_ids);
        prop_assert!(due.windows(2).all(|w| w[0].next_review_at <= w[1].next_review_at));
    }
}
