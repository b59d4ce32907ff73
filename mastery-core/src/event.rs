//! Lifecycle event payloads handed to the notification collaborator.

use crate::{LifecycleEventType, Timestamp, UserId, VocabularyId, VocabularyRecord};
use serde::{Deserialize, Serialize};

/// A lifecycle event. The core only produces these; delivery is external.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub vocabulary_id: VocabularyId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub user_id: UserId,
    pub event_type: LifecycleEventType,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub occurred_at: Timestamp,
}

impl LifecycleEvent {
    pub fn new(
        record: &VocabularyRecord,
        event_type: LifecycleEventType,
        occurred_at: Timestamp,
    ) -> Self {
        Self {
            vocabulary_id: record.id,
            user_id: record.user_id,
            event_type,
            occurred_at,
        }
    }
}
