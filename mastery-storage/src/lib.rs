//! Mastery Storage - Repository Trait and Mock Implementation
//!
//! Defines the persistence contract for vocabulary records. Host applications
//! implement [`VocabularyRepository`] over their database; [`MockStorage`] is
//! the in-memory implementation used by tests and embedded setups.
//!
//! # Atomicity
//!
//! Every record carries a `version`. [`VocabularyRepository::update`] is a
//! compare-and-swap: it succeeds only when the stored version equals the
//! caller's `expected_version`, and bumps the version on success. A stale
//! writer gets `StorageError::PersistenceConflict` and must re-read.

use mastery_core::{
    MasteryResult, Stage, StorageError, Timestamp, UserId, ValidationError, VocabularyId,
    VocabularyRecord,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// QUERY TYPES
// ============================================================================

/// Filter for [`VocabularyRepository::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
    /// Owner of the records
    pub user_id: UserId,
    /// Only records in this stage
    pub stage: Option<Stage>,
    /// Only records whose `next_review_at` is at or before this instant
    pub due_before: Option<Timestamp>,
}

impl RecordQuery {
    /// All records of a user.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id,
            stage: None,
            due_before: None,
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn due_before(mut self, as_of: Timestamp) -> Self {
        self.due_before = Some(as_of);
        self
    }

    /// Whether a record satisfies every filter.
    pub fn matches(&self, record: &VocabularyRecord) -> bool {
        record.user_id == self.user_id
            && self.stage.map_or(true, |stage| record.stage == stage)
            && self
                .due_before
                .map_or(true, |as_of| record.next_review_at.is_some_and(|due| due <= as_of))
    }
}

// ============================================================================
// REPOSITORY TRAIT
// ============================================================================

/// Persistence contract for vocabulary records.
pub trait VocabularyRepository: Send + Sync {
    /// Insert a new record. Fails if the id or the (user, word) pair exists.
    fn insert(&self, record: &VocabularyRecord) -> MasteryResult<()>;

    /// Get a record by ID.
    fn get(&self, id: VocabularyId) -> MasteryResult<Option<VocabularyRecord>>;

    /// Find the record of a user for an already-normalized word.
    fn find_by_word(&self, user_id: UserId, word: &str)
        -> MasteryResult<Option<VocabularyRecord>>;

    /// Compare-and-swap write. Returns the stored record with its new version.
    ///
    /// `user_id`, `word` and `created_at` are fixed at insert; an update
    /// that changes any of them fails with a validation error.
    fn update(
        &self,
        record: &VocabularyRecord,
        expected_version: u64,
    ) -> MasteryResult<VocabularyRecord>;

    /// Physically remove a record, returning what was stored.
    fn delete(&self, id: VocabularyId) -> MasteryResult<VocabularyRecord>;

    /// Records matching a filter, in no particular order.
    fn query(&self, query: &RecordQuery) -> MasteryResult<Vec<VocabularyRecord>>;

    /// Every record of a user, archived ones included.
    fn list_by_user(&self, user_id: UserId) -> MasteryResult<Vec<VocabularyRecord>> {
        self.query(&RecordQuery::for_user(user_id))
    }
}

// ============================================================================
// MOCK STORAGE
// ============================================================================

/// In-memory storage. One write lock covers each compare-and-swap.
#[derive(Debug, Default, Clone)]
pub struct MockStorage {
    records: Arc<RwLock<HashMap<VocabularyId, VocabularyRecord>>>,
}

impl MockStorage {
    /// Create a new mock storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) -> MasteryResult<()> {
        self.write()?.clear();
        Ok(())
    }

    /// Get count of stored records.
    pub fn record_count(&self) -> MasteryResult<usize> {
        Ok(self.read()?.len())
    }

    fn read(&self) -> MasteryResult<RwLockReadGuard<'_, HashMap<VocabularyId, VocabularyRecord>>> {
        self.records
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(
        &self,
    ) -> MasteryResult<RwLockWriteGuard<'_, HashMap<VocabularyId, VocabularyRecord>>> {
        self.records
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

impl VocabularyRepository for MockStorage {
    fn insert(&self, record: &VocabularyRecord) -> MasteryResult<()> {
        record.check_invariants()?;
        let mut records = self.write()?;
        let duplicate = records.contains_key(&record.id)
            || records
                .values()
                .any(|r| r.user_id == record.user_id && r.word == record.word);
        if duplicate {
            return Err(StorageError::AlreadyExists {
                user_id: record.user_id,
                word: record.word.clone(),
            }
            .into());
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    fn get(&self, id: VocabularyId) -> MasteryResult<Option<VocabularyRecord>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn find_by_word(
        &self,
        user_id: UserId,
        word: &str,
    ) -> MasteryResult<Option<VocabularyRecord>> {
        Ok(self
            .read()?
            .values()
            .find(|r| r.user_id == user_id && r.word == word)
            .cloned())
    }

    fn update(
        &self,
        record: &VocabularyRecord,
        expected_version: u64,
    ) -> MasteryResult<VocabularyRecord> {
        record.check_invariants()?;
        let mut records = self.write()?;
        let stored = records
            .get_mut(&record.id)
            .ok_or(StorageError::NotFound { id: record.id })?;

        if stored.version != expected_version {
            return Err(StorageError::PersistenceConflict {
                id: record.id,
                expected_version,
                actual_version: stored.version,
            }
            .into());
        }

        if let Some(field) = changed_identity_field(stored, record) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                reason: format!("{} is immutable on record {}", field, record.id),
            }
            .into());
        }

        let mut next = record.clone();
        next.version = expected_version + 1;
        *stored = next.clone();
        Ok(next)
    }

    fn delete(&self, id: VocabularyId) -> MasteryResult<VocabularyRecord> {
        self.write()?
            .remove(&id)
            .ok_or_else(|| StorageError::NotFound { id }.into())
    }

    fn query(&self, query: &RecordQuery) -> MasteryResult<Vec<VocabularyRecord>> {
        Ok(self
            .read()?
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }
}

/// First field fixed at creation that differs between stored and incoming.
fn changed_identity_field(
    stored: &VocabularyRecord,
    incoming: &VocabularyRecord,
) -> Option<&'static str> {
    if stored.user_id != incoming.user_id {
        Some("user_id")
    } else if stored.word != incoming.word {
        Some("word")
    } else if stored.created_at != incoming.created_at {
        Some("created_at")
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================
