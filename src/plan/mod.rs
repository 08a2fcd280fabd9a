//! Session-plan scheduling core: data model, court allocation, rotation
//! scheduling, duration redistribution, and attendance tracking.
//!
//! Everything in this module is pure, synchronous computation over the
//! in-memory [`model::Plan`]; persistence and polling live in [`crate::api`]
//! and [`crate::live`].

pub mod allocator;
pub mod attendance;
pub mod model;
pub mod redistribute;
pub mod rotation;
pub mod time;

use model::{PhaseKind, Plan};

/// Recompute every piece of derived state after a mutation.
///
/// Runs the pipeline in dependency order for each phase: court allocation
/// first (rotation reads the seed assignment it writes), then the rotation
/// schedule, then duration redistribution against the resulting per-court
/// time budget. Completes synchronously before control returns to the caller.
pub fn recompute(plan: &mut Plan) {
    let groups = plan.player_groups.clone();
    let start_time = plan.start_time.clone();

    for index in 0..plan.timeline.len() {
        let offset = plan.phase_offset_minutes(index);
        let phase = &mut plan.timeline[index];

        allocator::sync_phase_courts(phase, &groups);

        if phase.kind == PhaseKind::Rotation {
            rotation::rebuild_rotation(phase, &start_time, offset);
        } else {
            phase.blocks.clear();
            phase.rotation_minutes = 0;
        }

        let available = phase.available_court_minutes();
        for court in &mut phase.courts {
            redistribute::redistribute_all(court, available);
        }
    }
}
