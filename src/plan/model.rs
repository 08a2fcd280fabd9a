//! In-memory data model for a session plan: groups, phases, courts, activities.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a player as assigned by the remote roster.
pub type PlayerId = i64;
/// Identifier of a drill in the remote drill library.
pub type DrillId = i64;

/// Attendance state of a player for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    /// No response recorded yet.
    Pending,
    /// Confirmed attending; the player can be placed in a group.
    Attending,
    /// Confirmed not attending.
    Declined,
}

/// A roster entry loaded once at session start. Only `status` is mutated by
/// this crate; everything else is owned by the remote roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Roster primary key.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Current attendance state.
    pub status: AttendanceStatus,
}

/// A named group of players built during planning.
///
/// `player_ids` behaves as an ordered set: a player id appears in at most one
/// group across the whole plan, enforced by [`Plan::detach_player`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerGroup {
    /// Stable identifier for the group.
    pub id: Uuid,
    /// Display name, auto-lettered ("Group A", "Group B", ...).
    pub name: String,
    /// Members in insertion order.
    pub player_ids: Vec<PlayerId>,
}

impl PlayerGroup {
    /// Build an empty group with a fresh identifier.
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            player_ids: Vec::new(),
        }
    }
}

/// Entry of the drill library supplied in the bootstrap snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drill {
    /// Library primary key.
    pub id: DrillId,
    /// Drill name shown on activities that reference it.
    pub name: String,
    /// Coarse category (e.g. "Conditioning").
    pub category: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Free-form description.
    pub description: String,
    /// Suggested duration from the library; the plan recomputes actual durations.
    pub duration_minutes: u32,
    /// Optional demonstration video.
    pub video_url: String,
}

/// A drill or custom exercise scheduled on a court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    /// Display name (drill name, or free text for custom activities).
    pub name: String,
    /// Backing drill in the library, if any.
    pub drill_id: Option<DrillId>,
    /// Minutes allotted by the redistribution pass; never edited directly.
    pub duration_minutes: u32,
}

/// A sub-location within a phase holding group assignments and activities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Court {
    /// Stable identifier for the court.
    pub id: Uuid,
    /// Display name ("Court 1", "Court 2", ...).
    pub name: String,
    /// Assigned groups. Rotation/freeplay phases keep at most one entry per
    /// court (the rotation seed); warmup/fitness co-locate all groups.
    pub assigned_group_ids: Vec<Uuid>,
    /// Ordered activity list; durations always sum to the court's available time.
    pub activities: Vec<Activity>,
}

impl Court {
    /// Build an empty court named after its zero-based position.
    pub fn numbered(index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: format!("Court {}", index + 1),
            assigned_group_ids: Vec::new(),
            activities: Vec::new(),
        }
    }

    /// First assigned group, used as the anchor for rotation scheduling.
    pub fn seed_group(&self) -> Option<Uuid> {
        self.assigned_group_ids.first().copied()
    }
}

/// Kind of a timeline phase, driving court allocation and scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Everyone together on one court.
    Warmup,
    /// Conditioning block, one court.
    Fitness,
    /// Groups cycle through courts in fixed sub-blocks.
    Rotation,
    /// Unstructured play, one court per group.
    Freeplay,
}

impl PhaseKind {
    /// Number of courts this phase should hold for the given group count.
    pub fn target_court_count(self, group_count: usize) -> usize {
        match self {
            PhaseKind::Warmup | PhaseKind::Fitness => 1,
            PhaseKind::Rotation | PhaseKind::Freeplay => group_count.max(1),
        }
    }
}

/// One time-boxed step of a rotation schedule.
///
/// Derived data: fully rebuilt whenever rotation inputs change, never edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationBlock {
    /// Wall-clock "HH:MM" start of the block.
    pub start_time: String,
    /// Wall-clock "HH:MM" end of the block.
    pub end_time: String,
    /// Court id to group id, in court order.
    pub assignments: IndexMap<Uuid, Uuid>,
}

/// A named, timed segment of the session timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    /// Stable identifier for the phase.
    pub id: Uuid,
    /// Phase kind.
    pub kind: PhaseKind,
    /// Display name.
    pub name: String,
    /// Total phase length in minutes.
    pub duration_minutes: u32,
    /// Courts in play during this phase.
    pub courts: Vec<Court>,
    /// Length of one rotation sub-block; equals `duration_minutes` when the
    /// rotation degenerates. Only meaningful for [`PhaseKind::Rotation`].
    pub rotation_minutes: u32,
    /// Rotation schedule; empty unless the phase rotates with two or more groups.
    pub blocks: Vec<RotationBlock>,
    /// Whether the phase editor is expanded. Presentation-only.
    pub is_open: bool,
}

impl Phase {
    /// Build a phase with no courts; the allocator fills them in.
    pub fn new(kind: PhaseKind, name: String, duration_minutes: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name,
            duration_minutes,
            courts: Vec::new(),
            rotation_minutes: 0,
            blocks: Vec::new(),
            is_open: true,
        }
    }

    /// Time available to each court of this phase.
    ///
    /// Rotation phases box every court into one sub-block; all other kinds give
    /// courts the full phase duration.
    pub fn available_court_minutes(&self) -> u32 {
        if self.kind == PhaseKind::Rotation && self.rotation_minutes > 0 {
            self.rotation_minutes
        } else {
            self.duration_minutes
        }
    }

    /// Lookup a court by id.
    pub fn court(&self, court_id: Uuid) -> Option<&Court> {
        self.courts.iter().find(|court| court.id == court_id)
    }

    /// Mutable lookup of a court by id.
    pub fn court_mut(&mut self, court_id: Uuid) -> Option<&mut Court> {
        self.courts.iter_mut().find(|court| court.id == court_id)
    }
}

/// The whole session plan: grouping roster plus the ordered phase timeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Session start as "HH:MM"; anchors every derived wall-clock time.
    pub start_time: String,
    /// Player groups built for this session.
    pub player_groups: Vec<PlayerGroup>,
    /// Phases in session order; their durations define all offsets.
    pub timeline: Vec<Phase>,
}

impl Plan {
    /// Build an empty plan anchored at the given start time.
    pub fn new(start_time: String) -> Self {
        Self {
            start_time,
            player_groups: Vec::new(),
            timeline: Vec::new(),
        }
    }

    /// Total session length implied by the timeline.
    pub fn total_minutes(&self) -> u32 {
        self.timeline.iter().map(|phase| phase.duration_minutes).sum()
    }

    /// Minute offset of the phase at `index` from the session start.
    pub fn phase_offset_minutes(&self, index: usize) -> u32 {
        self.timeline
            .iter()
            .take(index)
            .map(|phase| phase.duration_minutes)
            .sum()
    }

    /// Lookup a phase by id.
    pub fn phase(&self, phase_id: Uuid) -> Option<&Phase> {
        self.timeline.iter().find(|phase| phase.id == phase_id)
    }

    /// Mutable lookup of a phase by id.
    pub fn phase_mut(&mut self, phase_id: Uuid) -> Option<&mut Phase> {
        self.timeline.iter_mut().find(|phase| phase.id == phase_id)
    }

    /// Position of a phase in the timeline.
    pub fn phase_index(&self, phase_id: Uuid) -> Option<usize> {
        self.timeline.iter().position(|phase| phase.id == phase_id)
    }

    /// Lookup a group by id.
    pub fn group(&self, group_id: Uuid) -> Option<&PlayerGroup> {
        self.player_groups.iter().find(|group| group.id == group_id)
    }

    /// Mutable lookup of a group by id.
    pub fn group_mut(&mut self, group_id: Uuid) -> Option<&mut PlayerGroup> {
        self.player_groups
            .iter_mut()
            .find(|group| group.id == group_id)
    }

    /// Name for the next group, lettered after the current count.
    pub fn next_group_name(&self) -> String {
        let letter = char::from(b'A' + (self.player_groups.len() % 26) as u8);
        format!("Group {letter}")
    }

    /// Remove a group and cascade the removal into every court assignment.
    ///
    /// Returns `false` when the id is unknown.
    pub fn remove_group(&mut self, group_id: Uuid) -> bool {
        let before = self.player_groups.len();
        self.player_groups.retain(|group| group.id != group_id);
        if self.player_groups.len() == before {
            return false;
        }

        for phase in &mut self.timeline {
            for court in &mut phase.courts {
                court.assigned_group_ids.retain(|id| *id != group_id);
            }
        }
        true
    }

    /// Remove a player from whichever group currently holds it.
    ///
    /// Returns the group id and member position so an optimistic mutation can
    /// be rolled back.
    pub fn detach_player(&mut self, player_id: PlayerId) -> Option<(Uuid, usize)> {
        for group in &mut self.player_groups {
            if let Some(position) = group.player_ids.iter().position(|id| *id == player_id) {
                group.player_ids.remove(position);
                return Some((group.id, position));
            }
        }
        None
    }

    /// Set of player ids currently assigned to any group.
    pub fn assigned_player_ids(&self) -> Vec<PlayerId> {
        self.player_groups
            .iter()
            .flat_map(|group| group.player_ids.iter().copied())
            .collect()
    }
}
