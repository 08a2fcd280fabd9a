//! Round-robin rotation scheduling for rotation-type phases.

use std::collections::HashSet;

use indexmap::IndexMap;
use uuid::Uuid;

use crate::plan::{
    model::{Phase, RotationBlock},
    time::minutes_to_time_str,
};

/// Rebuild the rotation schedule of a phase from scratch.
///
/// Participating courts are those carrying a seed group. With fewer than two
/// seeds there is nothing to rotate: the block list is cleared and the
/// rotation length becomes the full phase duration. The same degradation
/// applies when two courts share a seed group, which breaks the required 1:1
/// group/court correspondence.
///
/// With `n` seeds, `rotation_minutes = duration / n` (integer division;
/// leftover minutes stay unscheduled) and block `i` assigns court `j` the seed
/// of court `(j - i) mod n`, so every group visits every court exactly once.
/// Block windows are anchored at `session_start` plus the phase's offset.
pub fn rebuild_rotation(phase: &mut Phase, session_start: &str, phase_offset_minutes: u32) {
    let seeds: Vec<(Uuid, Uuid)> = phase
        .courts
        .iter()
        .filter_map(|court| court.seed_group().map(|group| (court.id, group)))
        .collect();

    let n = seeds.len();
    let distinct: HashSet<Uuid> = seeds.iter().map(|(_, group)| *group).collect();
    if n < 2 || distinct.len() != n {
        phase.blocks.clear();
        phase.rotation_minutes = phase.duration_minutes;
        return;
    }

    phase.rotation_minutes = phase.duration_minutes / n as u32;

    let mut blocks = Vec::with_capacity(n);
    for step in 0..n {
        let start_offset = phase_offset_minutes + step as u32 * phase.rotation_minutes;
        let end_offset = start_offset + phase.rotation_minutes;

        let mut assignments = IndexMap::with_capacity(n);
        for (position, (court_id, _)) in seeds.iter().enumerate() {
            // Cyclic shift by one court per step.
            let source = (position + n - step) % n;
            assignments.insert(*court_id, seeds[source].1);
        }

        blocks.push(RotationBlock {
            start_time: minutes_to_time_str(session_start, start_offset as i64),
            end_time: minutes_to_time_str(session_start, end_offset as i64),
            assignments,
        });
    }

    phase.blocks = blocks;
}
