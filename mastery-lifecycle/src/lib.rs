//! Mastery Lifecycle - Coordination and Notification
//!
//! [`LifecycleCoordinator`] owns every stage change of a vocabulary record:
//! it scores practice outcomes, schedules reviews, persists the result with a
//! compare-and-swap and then hands the resulting [`mastery_core::LifecycleEvent`]
//! to a [`NotificationSink`].
//!
//! Time is never read from the clock here. Callers pass `now` (or `as_of`)
//! into every operation.

mod coordinator;
mod sink;

pub use coordinator::LifecycleCoordinator;
pub use sink::{BroadcastSink, CollectingSink, NotificationSink};
