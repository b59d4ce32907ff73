//! Mastery Core - Entity Types, Scoring and Scheduling
//!
//! Pure data structures and pure functions. All other crates depend on this.
//! Nothing in this crate performs I/O or reads the clock: every time-dependent
//! function takes `now` from the caller.
//!
//! # Components
//!
//! - [`ScoringEngine`]: outcome → score delta and signal
//! - [`ReviewScheduler`]: (stage, streak, now) → next due time
//! - [`Lifecycle`]: the transition table tying both together

pub mod config;
pub mod entities;
pub mod enums;
pub mod error;
pub mod event;
pub mod identity;
pub mod schedule;
pub mod scoring;
pub mod transition;

pub use config::{SchedulerConfig, DEFAULT_REVIEW_INTERVALS_SECS, MAX_MASTERY_SCORE};
pub use entities::{normalize_word, PracticeOutcome, VocabularyRecord};
pub use enums::{LifecycleEventType, Stage, StageParseError, Trigger};
pub use error::{
    ConfigError, LifecycleError, MasteryError, MasteryResult, StorageError, ValidationError,
};
pub use event::LifecycleEvent;
pub use identity::{new_entity_id, EntityId, EntityIdType, Timestamp, UserId, VocabularyId};
pub use schedule::ReviewScheduler;
pub use scoring::{ScoreDelta, ScoreSignal, ScoringEngine};
pub use transition::{Lifecycle, Transition};
