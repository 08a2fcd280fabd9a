//! Persisted plan snapshot and the bootstrap payload loaded at construction.
//!
//! Key casing mirrors the stored JSON: camelCase overall, with the historical
//! snake_case exceptions (`player_ids`, `drill_id`, `sub_blocks`) kept so
//! previously saved plans still parse.

use std::time::SystemTime;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{drill::DrillDto, format_system_time, validation::validate_clock_time},
    plan::model::{
        Activity, AttendanceStatus, Court, Drill, DrillId, Phase, PhaseKind, Plan, Player,
        PlayerGroup, PlayerId, RotationBlock,
    },
};

/// Wire form of a whole session plan.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlanSnapshot {
    /// Session start as "HH:MM"; absent in plans saved before it was recorded.
    #[serde(default)]
    #[validate(custom(function = "validate_clock_time"))]
    pub start_time: Option<String>,
    /// Player groups in display order.
    #[serde(default)]
    pub player_groups: Vec<GroupSnapshot>,
    /// Phase timeline in session order.
    #[serde(default)]
    #[validate(nested)]
    pub timeline: Vec<PhaseSnapshot>,
    /// RFC 3339 stamp written on save; ignored on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// Wire form of a player group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSnapshot {
    /// Stable group id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Member player ids in order.
    #[serde(rename = "player_ids", default)]
    pub player_ids: Vec<PlayerId>,
}

/// Wire form of a timeline phase.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSnapshot {
    /// Stable phase id.
    pub id: Uuid,
    /// Phase kind tag.
    #[serde(rename = "type")]
    pub kind: PhaseKind,
    /// Display name.
    pub name: String,
    /// Phase length in minutes.
    #[validate(range(min = 1))]
    pub duration: u32,
    /// Courts in play during the phase.
    #[serde(default)]
    pub courts: Vec<CourtSnapshot>,
    /// Length of one rotation sub-block, when the phase rotates.
    #[serde(default)]
    pub rotation_duration: u32,
    /// Derived rotation schedule.
    #[serde(rename = "sub_blocks", default)]
    pub sub_blocks: Vec<BlockSnapshot>,
    /// Editor expansion flag; presentation-only.
    #[serde(default)]
    pub is_open: bool,
}

/// Wire form of a court.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtSnapshot {
    /// Stable court id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Assigned group ids.
    #[serde(default)]
    pub assigned_group_ids: Vec<Uuid>,
    /// Ordered activities with their allotted minutes.
    #[serde(default)]
    pub activities: Vec<ActivitySnapshot>,
}

/// Wire form of a scheduled activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    /// Display name.
    pub name: String,
    /// Backing drill, if any.
    #[serde(default)]
    pub drill_id: Option<DrillId>,
    /// Allotted minutes.
    pub duration: u32,
}

/// Wire form of one rotation sub-block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSnapshot {
    /// "HH:MM" block start.
    pub start_time: String,
    /// "HH:MM" block end.
    pub end_time: String,
    /// Court id to group id, in court order.
    #[serde(default)]
    pub assignments: IndexMap<Uuid, Uuid>,
}

/// Roster entry as served by the bootstrap endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDto {
    /// Roster primary key.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Current attendance status.
    pub status: AttendanceStatus,
}

/// Static snapshot supplied once when the planner is constructed.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapDto {
    /// Session primary key.
    pub session_id: i64,
    /// Session start as "HH:MM".
    #[validate(custom(function = "validate_clock_time"))]
    pub session_start_time: String,
    /// Planned session length in minutes.
    #[validate(range(min = 1))]
    pub session_duration: u32,
    /// Previously saved plan, if any.
    #[serde(default)]
    #[validate(nested)]
    pub plan: Option<PlanSnapshot>,
    /// Roster for attendance and grouping.
    #[serde(default)]
    pub players: Vec<PlayerDto>,
    /// Drill library available to this coach.
    #[serde(default)]
    pub drills: Vec<DrillDto>,
    /// Tag vocabulary for drill filtering.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Validated, domain-side form of the bootstrap snapshot.
#[derive(Debug, Clone)]
pub struct SessionBootstrap {
    /// Session primary key.
    pub session_id: i64,
    /// Planned session length in minutes.
    pub session_duration: u32,
    /// Plan restored from the snapshot, or a fresh one anchored at the start time.
    pub plan: Plan,
    /// Mutable roster copy.
    pub roster: Vec<Player>,
    /// Drill library.
    pub drills: Vec<Drill>,
    /// Tag vocabulary.
    pub tags: Vec<String>,
}

impl From<BootstrapDto> for SessionBootstrap {
    fn from(value: BootstrapDto) -> Self {
        let start_time = value.session_start_time.clone();
        let plan = match value.plan {
            Some(snapshot) => snapshot.into_plan(start_time),
            None => Plan::new(start_time),
        };

        Self {
            session_id: value.session_id,
            session_duration: value.session_duration,
            plan,
            roster: value
                .players
                .into_iter()
                .map(|player| Player {
                    id: player.id,
                    name: player.name,
                    status: player.status,
                })
                .collect(),
            drills: value.drills.into_iter().map(Into::into).collect(),
            tags: value.tags,
        }
    }
}

impl PlanSnapshot {
    /// Capture the current plan for persistence, stamping the save time.
    pub fn capture(plan: &Plan) -> Self {
        Self {
            start_time: Some(plan.start_time.clone()),
            player_groups: plan
                .player_groups
                .iter()
                .map(|group| GroupSnapshot {
                    id: group.id,
                    name: group.name.clone(),
                    player_ids: group.player_ids.clone(),
                })
                .collect(),
            timeline: plan.timeline.iter().map(PhaseSnapshot::capture).collect(),
            saved_at: Some(format_system_time(SystemTime::now())),
        }
    }

    /// Restore a domain plan, anchoring at `fallback_start` when the snapshot
    /// predates recorded start times.
    pub fn into_plan(self, fallback_start: String) -> Plan {
        Plan {
            start_time: self.start_time.unwrap_or(fallback_start),
            player_groups: self
                .player_groups
                .into_iter()
                .map(|group| PlayerGroup {
                    id: group.id,
                    name: group.name,
                    player_ids: group.player_ids,
                })
                .collect(),
            timeline: self.timeline.into_iter().map(PhaseSnapshot::into_phase).collect(),
        }
    }
}

impl PhaseSnapshot {
    fn capture(phase: &Phase) -> Self {
        Self {
            id: phase.id,
            kind: phase.kind,
            name: phase.name.clone(),
            duration: phase.duration_minutes,
            courts: phase
                .courts
                .iter()
                .map(|court| CourtSnapshot {
                    id: court.id,
                    name: court.name.clone(),
                    assigned_group_ids: court.assigned_group_ids.clone(),
                    activities: court
                        .activities
                        .iter()
                        .map(|activity| ActivitySnapshot {
                            name: activity.name.clone(),
                            drill_id: activity.drill_id,
                            duration: activity.duration_minutes,
                        })
                        .collect(),
                })
                .collect(),
            rotation_duration: phase.rotation_minutes,
            sub_blocks: phase
                .blocks
                .iter()
                .map(|block| BlockSnapshot {
                    start_time: block.start_time.clone(),
                    end_time: block.end_time.clone(),
                    assignments: block.assignments.clone(),
                })
                .collect(),
            is_open: phase.is_open,
        }
    }

    fn into_phase(self) -> Phase {
        Phase {
            id: self.id,
            kind: self.kind,
            name: self.name,
            duration_minutes: self.duration,
            courts: self
                .courts
                .into_iter()
                .map(|court| Court {
                    id: court.id,
                    name: court.name,
                    assigned_group_ids: court.assigned_group_ids,
                    activities: court
                        .activities
                        .into_iter()
                        .map(|activity| Activity {
                            name: activity.name,
                            drill_id: activity.drill_id,
                            duration_minutes: activity.duration,
                        })
                        .collect(),
                })
                .collect(),
            rotation_minutes: self.rotation_duration,
            blocks: self
                .sub_blocks
                .into_iter()
                .map(|block| RotationBlock {
                    start_time: block.start_time,
                    end_time: block.end_time,
                    assignments: block.assignments,
                })
                .collect(),
            is_open: self.is_open,
        }
    }
}
