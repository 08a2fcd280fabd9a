//! Payload returned by the live-state poll endpoint.
//!
//! Field names follow the endpoint's camelCase JSON; optional fields are only
//! present for the session status they belong to.

use serde::Deserialize;

/// Lifecycle tag of a polled session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatusDto {
    /// The session has not reached its start time yet.
    NotYetStarted,
    /// The session should have started but has not been activated.
    Pending,
    /// The session is running.
    Active,
    /// The session is over.
    Finished,
    /// The server reported a failure inside an otherwise valid reply.
    Error,
}

/// One full live-state snapshot from the poll endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveStateDto {
    /// Where the session is in its lifecycle.
    pub session_status: SessionStatusDto,
    /// Display title ("Group : HH:MM - HH:MM"), when available.
    #[serde(default)]
    pub session_title: Option<String>,
    /// Seconds until the session starts; waiting sessions only.
    #[serde(default)]
    pub time_to_start: Option<f64>,
    /// Seconds left in the whole session; active sessions only.
    #[serde(default)]
    pub total_time_left: Option<f64>,
    /// Currently running phase; active sessions only.
    #[serde(default)]
    pub current_phase: Option<PhaseSnapshotDto>,
    /// Per-court activity snapshots; active sessions only.
    #[serde(default)]
    pub courts: Option<Vec<CourtSnapshotDto>>,
    /// Names of assigned coaches; waiting sessions only.
    #[serde(default)]
    pub coaches: Option<Vec<String>>,
    /// Names of confirmed attendees; waiting sessions only.
    #[serde(default)]
    pub attendees: Option<Vec<String>>,
    /// Failure reason accompanying [`SessionStatusDto::Error`].
    #[serde(default)]
    pub message: Option<String>,
}

/// Phase countdown data inside a live snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSnapshotDto {
    /// Phase display name.
    pub name: String,
    /// Seconds remaining in the phase.
    pub time_left: f64,
    /// Full phase length in seconds.
    pub duration: f64,
}

/// Activity countdown data for one court.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySnapshotDto {
    /// Activity display name.
    pub name: String,
    /// Seconds remaining in the activity.
    pub time_left: f64,
    /// Full activity length in seconds.
    pub duration: f64,
}

/// Preview of the activity that follows the current one.
#[derive(Debug, Clone, Deserialize)]
pub struct NextActivityDto {
    /// Activity display name.
    pub name: String,
}

/// Live snapshot of one court.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtSnapshotDto {
    /// Court display name; doubles as the court's timer id.
    pub court_name: String,
    /// Display label of the group on this court.
    pub player_group: String,
    /// Names of the players on this court.
    #[serde(default)]
    pub players: Vec<String>,
    /// Activity currently running on this court.
    pub current_activity: ActivitySnapshotDto,
    /// Activity coming up next, if any.
    #[serde(default)]
    pub next_activity: Option<NextActivityDto>,
}
