//! Core entity structures

use crate::{
    MasteryResult, Stage, Timestamp, UserId, ValidationError, VocabularyId, MAX_MASTERY_SCORE,
};
use serde::{Deserialize, Serialize};

/// Normalize a word into its record key: trimmed and lowercased.
///
/// Returns a validation error for words that are empty after trimming.
pub fn normalize_word(word: &str) -> MasteryResult<String> {
    let normalized = word.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(ValidationError::RequiredFieldMissing {
            field: "word".to_string(),
        }
        .into());
    }
    Ok(normalized)
}

/// VocabularyRecord - mastery state of one word for one learner.
/// There is exactly one record per (user, normalized word).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VocabularyRecord {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: VocabularyId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: UserId,
    pub word: String,
    /// 0..=100
    pub mastery_score: u8,
    pub error_count: u32,
    pub stage: Stage,
    /// Consecutive successful reviews
    pub review_streak: u32,
    /// Set iff `stage == Review`
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub next_review_at: Option<Timestamp>,
    /// Write counter checked by the repository on every update
    pub version: u64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl VocabularyRecord {
    /// Create a fresh `New` record for a word.
    pub fn new(user_id: UserId, word: &str, now: Timestamp) -> MasteryResult<Self> {
        Ok(Self {
            id: VocabularyId::now_v7(),
            user_id,
            word: normalize_word(word)?,
            mastery_score: 0,
            error_count: 0,
            stage: Stage::New,
            review_streak: 0,
            next_review_at: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether the record is in Review and its due time is at or before `as_of`.
    pub fn is_due(&self, as_of: Timestamp) -> bool {
        self.stage == Stage::Review && self.next_review_at.is_some_and(|due| due <= as_of)
    }

    /// Verify the record-level invariants.
    pub fn check_invariants(&self) -> MasteryResult<()> {
        if self.mastery_score > MAX_MASTERY_SCORE {
            return Err(self.violation(format!(
                "mastery_score {} exceeds {}",
                self.mastery_score, MAX_MASTERY_SCORE
            )));
        }
        match (self.stage, self.next_review_at) {
            (Stage::Review, None) => {
                return Err(self.violation("stage Review requires next_review_at".to_string()));
            }
            (stage, Some(_)) if stage != Stage::Review => {
                return Err(self.violation(format!(
                    "next_review_at must be empty in stage {}",
                    stage
                )));
            }
            _ => {}
        }
        if self.word.is_empty() || self.word != self.word.trim().to_lowercase() {
            return Err(self.violation(format!("word '{}' is not normalized", self.word)));
        }
        Ok(())
    }

    fn violation(&self, reason: String) -> crate::MasteryError {
        ValidationError::InvariantViolation {
            id: self.id,
            reason,
        }
        .into()
    }
}

/// Result of a single practice attempt, supplied by the practice session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PracticeOutcome {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub vocabulary_id: VocabularyId,
    pub correct: bool,
    /// Position of this attempt within the session (0 = first try)
    pub attempt_index: u32,
}

impl PracticeOutcome {
    pub fn correct(vocabulary_id: VocabularyId) -> Self {
        Self {
            vocabulary_id,
            correct: true,
            attempt_index: 0,
        }
    }

    pub fn incorrect(vocabulary_id: VocabularyId) -> Self {
        Self {
            vocabulary_id,
            correct: false,
            attempt_index: 0,
        }
    }
}
