//! Attendance update payload.

use serde::Serialize;

use crate::plan::model::{AttendanceStatus, PlayerId};

/// Request body posted after an optimistic local status change.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceUpdateRequest {
    /// Roster id of the player whose status changed.
    pub player_id: PlayerId,
    /// The new status already applied locally.
    pub status: AttendanceStatus,
}
