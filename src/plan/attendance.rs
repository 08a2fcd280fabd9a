//! Attendance status cycling and the grouping consistency that goes with it.

use crate::plan::model::{AttendanceStatus, Plan, Player, PlayerId};
use uuid::Uuid;

/// Fixed cycling order for attendance statuses.
pub const STATUS_CYCLE: [AttendanceStatus; 3] = [
    AttendanceStatus::Pending,
    AttendanceStatus::Attending,
    AttendanceStatus::Declined,
];

/// Next status in the circular Pending → Attending → Declined cycle.
pub fn next_status(status: AttendanceStatus) -> AttendanceStatus {
    let position = STATUS_CYCLE
        .iter()
        .position(|candidate| *candidate == status)
        .unwrap_or(0);
    STATUS_CYCLE[(position + 1) % STATUS_CYCLE.len()]
}

/// Everything needed to undo one optimistic status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Player whose status was cycled.
    pub player_id: PlayerId,
    /// Status before the change.
    pub previous: AttendanceStatus,
    /// Status after the change.
    pub current: AttendanceStatus,
    /// Group slot the player was detached from, when leaving Attending.
    pub detached_from: Option<(Uuid, usize)>,
}

/// Cycle a player's status and keep group membership consistent.
///
/// Leaving Attending detaches the player from whatever group holds it (the
/// slot is recorded for rollback). Entering Attending only makes the player
/// available; nothing auto-assigns it. Returns `None` for unknown players.
pub fn cycle_status(plan: &mut Plan, roster: &mut [Player], player_id: PlayerId) -> Option<StatusChange> {
    let player = roster.iter_mut().find(|player| player.id == player_id)?;
    let previous = player.status;
    let current = next_status(previous);
    player.status = current;

    let detached_from = if previous == AttendanceStatus::Attending {
        plan.detach_player(player_id)
    } else {
        None
    };

    Some(StatusChange {
        player_id,
        previous,
        current,
        detached_from,
    })
}

/// Undo an optimistic status change after the remote report failed.
pub fn rollback_status(plan: &mut Plan, roster: &mut [Player], change: &StatusChange) {
    if let Some(player) = roster.iter_mut().find(|player| player.id == change.player_id) {
        player.status = change.previous;
    }

    if let Some((group_id, position)) = change.detached_from
        && let Some(group) = plan.group_mut(group_id)
    {
        let position = position.min(group.player_ids.len());
        group.player_ids.insert(position, change.player_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::model::PlayerGroup;

    fn roster() -> Vec<Player> {
        vec![
            Player {
                id: 1,
                name: "Asha".into(),
                status: AttendanceStatus::Pending,
            },
            Player {
                id: 2,
                name: "Ben".into(),
                status: AttendanceStatus::Attending,
            },
        ]
    }

    #[test]
    fn cycling_three_times_returns_to_the_start() {
        let mut status = AttendanceStatus::Pending;
        for _ in 0..STATUS_CYCLE.len() {
            status = next_status(status);
        }
        assert_eq!(status, AttendanceStatus::Pending);
    }

    #[test]
    fn leaving_attending_detaches_the_player() {
        let mut plan = Plan::default();
        let mut group = PlayerGroup::new("Group A".into());
        group.player_ids.push(2);
        let group_id = group.id;
        plan.player_groups.push(group);
        let mut roster = roster();

        let change = cycle_status(&mut plan, &mut roster, 2).unwrap();
        assert_eq!(change.previous, AttendanceStatus::Attending);
        assert_eq!(change.current, AttendanceStatus::Declined);
        assert_eq!(change.detached_from, Some((group_id, 0)));
        assert!(plan.player_groups[0].player_ids.is_empty());
    }

    #[test]
    fn entering_attending_does_not_auto_assign() {
        let mut plan = Plan::default();
        plan.player_groups.push(PlayerGroup::new("Group A".into()));
        let mut roster = roster();

        let change = cycle_status(&mut plan, &mut roster, 1).unwrap();
        assert_eq!(change.current, AttendanceStatus::Attending);
        assert!(plan.player_groups[0].player_ids.is_empty());
    }

    #[test]
    fn rollback_restores_status_and_group_slot() {
        let mut plan = Plan::default();
        let mut group = PlayerGroup::new("Group A".into());
        group.player_ids.extend([7, 2, 9]);
        plan.player_groups.push(group);
        let mut roster = roster();

        let change = cycle_status(&mut plan, &mut roster, 2).unwrap();
        rollback_status(&mut plan, &mut roster, &change);

        assert_eq!(roster[1].status, AttendanceStatus::Attending);
        assert_eq!(plan.player_groups[0].player_ids, vec![7, 2, 9]);
    }

    #[test]
    fn unknown_players_are_rejected() {
        let mut plan = Plan::default();
        let mut roster = roster();
        assert!(cycle_status(&mut plan, &mut roster, 99).is_none());
    }
}
