//! Renderable state of the live display, derived from poll snapshots.
//!
//! The display state holds the static text of the current view; countdown
//! values live in the timer engine and are looked up by the ids defined here.

use crate::dto::live::{LiveStateDto, SessionStatusDto};

/// Timer id for the pre-session countdown on the waiting screen.
pub const WAITING_TIMER: &str = "countdown";
/// Timer id for the whole-session countdown.
pub const MASTER_TIMER: &str = "master";
/// Timer id for the current phase countdown.
pub const PHASE_TIMER: &str = "phase";

/// Timer id for the activity countdown of one court.
pub fn court_timer_id(court_name: &str) -> String {
    format!("activity-{court_name}")
}

/// What the live display should currently show.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayState {
    /// No snapshot received yet.
    Loading,
    /// The session has not started; show the waiting room.
    Waiting(WaitingView),
    /// The session is running; show the court grid.
    Active(ActiveView),
    /// The session is over.
    Finished {
        /// Session title, when the last snapshot carried one.
        title: Option<String>,
    },
    /// Polling failed; the display is frozen with a reason.
    Failed {
        /// Human-readable failure reason.
        message: String,
    },
}

/// Waiting room content shown before the session starts.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitingView {
    /// Session title.
    pub title: Option<String>,
    /// Whether a start countdown is running under [`WAITING_TIMER`].
    ///
    /// False for sessions past their start time that were never activated.
    pub has_countdown: bool,
    /// Names of assigned coaches.
    pub coaches: Vec<String>,
    /// Names of confirmed attendees.
    pub attendees: Vec<String>,
}

/// Court grid content shown while the session runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveView {
    /// Session title.
    pub title: Option<String>,
    /// Name of the running phase.
    pub phase_name: String,
    /// One panel per court, in server order.
    pub courts: Vec<CourtView>,
}

/// One court panel of the active view.
#[derive(Debug, Clone, PartialEq)]
pub struct CourtView {
    /// Court display name; its activity timer runs under [`court_timer_id`].
    pub court_name: String,
    /// Label of the group on this court.
    pub player_group: String,
    /// Player names on this court.
    pub players: Vec<String>,
    /// Name of the running activity.
    pub activity_name: String,
    /// Name of the next activity, if one follows.
    pub next_activity: Option<String>,
}

impl DisplayState {
    /// Derive the view for a snapshot. Countdown bookkeeping happens in the
    /// poller; this only shapes the static text.
    pub fn from_snapshot(state: &LiveStateDto) -> Self {
        match state.session_status {
            SessionStatusDto::NotYetStarted | SessionStatusDto::Pending => {
                DisplayState::Waiting(WaitingView {
                    title: state.session_title.clone(),
                    has_countdown: state.session_status == SessionStatusDto::NotYetStarted
                        && state.time_to_start.is_some(),
                    coaches: state.coaches.clone().unwrap_or_default(),
                    attendees: state.attendees.clone().unwrap_or_default(),
                })
            }
            SessionStatusDto::Active => match &state.current_phase {
                Some(phase) => DisplayState::Active(ActiveView {
                    title: state.session_title.clone(),
                    phase_name: phase.name.clone(),
                    courts: state
                        .courts
                        .as_deref()
                        .unwrap_or_default()
                        .iter()
                        .map(|court| CourtView {
                            court_name: court.court_name.clone(),
                            player_group: court.player_group.clone(),
                            players: court.players.clone(),
                            activity_name: court.current_activity.name.clone(),
                            next_activity: court
                                .next_activity
                                .as_ref()
                                .map(|next| next.name.clone()),
                        })
                        .collect(),
                }),
                // An active session past its last phase renders as finished.
                None => DisplayState::Finished {
                    title: state.session_title.clone(),
                },
            },
            SessionStatusDto::Finished => DisplayState::Finished {
                title: state.session_title.clone(),
            },
            SessionStatusDto::Error => DisplayState::Failed {
                message: state
                    .message
                    .clone()
                    .unwrap_or_else(|| "live state unavailable".into()),
            },
        }
    }
}
