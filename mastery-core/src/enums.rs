//! Enum types shared across the mastery engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// STAGE
// ============================================================================

/// Lifecycle phase of a vocabulary record.
///
/// ```text
/// New ── outcome ──→ Learning ── ready-to-graduate ──→ Review ── max streak ──→ Graduated ── archive ──→ Archived
///                       ↺                                 ↺ (success: streak+1,
///                                                            failure: streak=0)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Stage {
    /// Created, never practiced
    New,
    /// Being practiced until the graduation threshold is reached
    Learning,
    /// Scheduled for spaced-repetition reviews
    Review,
    /// Passed the full review ladder
    Graduated,
    /// Retired from practice, kept for history
    Archived,
}

impl Stage {
    /// All stages in lifecycle order.
    pub const ALL: [Stage; 5] = [
        Stage::New,
        Stage::Learning,
        Stage::Review,
        Stage::Graduated,
        Stage::Archived,
    ];

    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            Stage::New => "New",
            Stage::Learning => "Learning",
            Stage::Review => "Review",
            Stage::Graduated => "Graduated",
            Stage::Archived => "Archived",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, StageParseError> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Stage::New),
            "learning" => Ok(Stage::Learning),
            "review" => Ok(Stage::Review),
            "graduated" => Ok(Stage::Graduated),
            "archived" => Ok(Stage::Archived),
            _ => Err(StageParseError(s.to_string())),
        }
    }

    /// Whether the record takes part in practice selection.
    pub fn is_active(&self) -> bool {
        !matches!(self, Stage::Archived)
    }

    /// Whether practice outcomes may still be recorded.
    pub fn accepts_outcomes(&self) -> bool {
        matches!(self, Stage::New | Stage::Learning | Stage::Review)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid stage string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageParseError(pub String);

impl fmt::Display for StageParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid stage: {}", self.0)
    }
}

impl std::error::Error for StageParseError {}

// ============================================================================
// TRIGGER
// ============================================================================

/// What was asked of the lifecycle when a transition was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    /// A practice outcome was submitted
    Outcome,
    /// Administrative or user archive request
    Archive,
    /// Forced return to Learning
    Reset,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trigger::Outcome => "outcome",
            Trigger::Archive => "archive",
            Trigger::Reset => "reset",
        };
        write!(f, "{}", s)
    }
}

// ============================================================================
// LIFECYCLE EVENT TYPE
// ============================================================================

/// Kind of lifecycle event handed to the notification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "kebab-case")]
pub enum LifecycleEventType {
    /// A review is due
    ReviewDue,
    /// A review attempt failed and the streak was reset
    ReviewFailed,
    /// Learning → Review
    GraduatedToReview,
    /// Review → Graduated
    Graduated,
    /// Graduated → Archived
    Archived,
    /// Forced back to Learning
    Reset,
    /// Removed by an administrative action
    Deleted,
}

impl LifecycleEventType {
    /// Wire name of the event (kebab-case).
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleEventType::ReviewDue => "review-due",
            LifecycleEventType::ReviewFailed => "review-failed",
            LifecycleEventType::GraduatedToReview => "graduated-to-review",
            LifecycleEventType::Graduated => "graduated",
            LifecycleEventType::Archived => "archived",
            LifecycleEventType::Reset => "reset",
            LifecycleEventType::Deleted => "deleted",
        }
    }
}

impl fmt::Display for LifecycleEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
