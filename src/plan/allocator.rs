//! Derives each phase's court list and default group assignment from the
//! current group roster.

use crate::plan::model::{Court, Phase, PhaseKind, PlayerGroup};

/// Bring `phase.courts` in line with the group roster.
///
/// Grows the list by appending sequentially numbered courts and shrinks it by
/// truncating from the end; retained courts keep their id and activities. The
/// default assignment is then rewritten: warmup/fitness co-locate every group
/// on the single court, rotation/freeplay give court `i` exactly group `i`.
///
/// Must run before rotation scheduling, which reads the seed assignment
/// written here.
pub fn sync_phase_courts(phase: &mut Phase, groups: &[PlayerGroup]) {
    let target = phase.kind.target_court_count(groups.len());

    while phase.courts.len() < target {
        let index = phase.courts.len();
        phase.courts.push(Court::numbered(index));
    }
    phase.courts.truncate(target);

    match phase.kind {
        PhaseKind::Warmup | PhaseKind::Fitness => {
            let all_ids = groups.iter().map(|group| group.id).collect();
            phase.courts[0].assigned_group_ids = all_ids;
        }
        PhaseKind::Rotation | PhaseKind::Freeplay => {
            for (index, court) in phase.courts.iter_mut().enumerate() {
                court.assigned_group_ids = match groups.get(index) {
                    Some(group) => vec![group.id],
                    None => Vec::new(),
                };
            }
        }
    }
}
