//! Error types for mastery operations

use crate::{Stage, Trigger, UserId, VocabularyId};
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Vocabulary record not found: {id}")]
    NotFound { id: VocabularyId },

    #[error("Vocabulary record already exists for user {user_id}: {word}")]
    AlreadyExists { user_id: UserId, word: String },

    #[error(
        "Persistence conflict on {id}: expected version {expected_version}, found {actual_version}"
    )]
    PersistenceConflict {
        id: VocabularyId,
        expected_version: u64,
        actual_version: u64,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// State machine errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Invalid state transition for {id}: {trigger} is not allowed from {from}")]
    InvalidStateTransition {
        id: VocabularyId,
        from: Stage,
        trigger: Trigger,
    },
}

/// Validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Invariant violated on {id}: {reason}")]
    InvariantViolation { id: VocabularyId, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read config file: {reason}")]
    Io { reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },
}

/// Master error type for all mastery errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MasteryError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl MasteryError {
    /// Whether the operation referenced an unknown record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MasteryError::Storage(StorageError::NotFound { .. }))
    }

    /// Whether a concurrent write won the race. Callers retry from a fresh read.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            MasteryError::Storage(StorageError::PersistenceConflict { .. })
        )
    }

    /// Whether the request violated the lifecycle state machine.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            MasteryError::Lifecycle(LifecycleError::InvalidStateTransition { .. })
        )
    }
}

/// Result type alias for mastery operations.
pub type MasteryResult<T> = Result<T, MasteryError>;
