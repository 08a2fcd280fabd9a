//! Apportions a court's available time across its ordered activity list.

use crate::plan::model::Court;

/// Split `total` minutes evenly over `count` slots, handing the remainder out
/// one minute at a time from the front.
fn even_split(total: u32, count: usize) -> Vec<u32> {
    let count_u32 = count as u32;
    let base = total / count_u32;
    let remainder = total % count_u32;
    (0..count_u32)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

/// Re-split the court's whole available time across all of its activities.
///
/// Used after an append, a removal, or a phase duration change. A court with
/// no activities is left untouched.
pub fn redistribute_all(court: &mut Court, total_minutes: u32) {
    if court.activities.is_empty() {
        return;
    }

    let shares = even_split(total_minutes, court.activities.len());
    for (activity, share) in court.activities.iter_mut().zip(shares) {
        activity.duration_minutes = share;
    }
}

/// Apply a manual duration edit at `index`, cascading the remainder to the
/// right.
///
/// The requested value is clamped to `[1, total - before - one minute per
/// later activity]`; the lower bound wins when that range is empty, so a
/// too-small budget floors at 1 rather than rejecting the edit. Activities
/// after `index` are then re-split evenly over whatever time is left,
/// overwriting their previous durations. Activities before `index` are never
/// touched, which makes edits order-sensitive by design.
pub fn edit_duration(court: &mut Court, index: usize, requested_minutes: u32, total_minutes: u32) {
    let count = court.activities.len();
    if index >= count {
        return;
    }

    let before: u32 = court.activities[..index]
        .iter()
        .map(|activity| activity.duration_minutes)
        .sum();
    let reserved_after = (count - index - 1) as u32;

    let ceiling = total_minutes
        .saturating_sub(before)
        .saturating_sub(reserved_after)
        .max(1);
    let clamped = requested_minutes.clamp(1, ceiling);
    court.activities[index].duration_minutes = clamped;

    let tail = count - index - 1;
    if tail == 0 {
        return;
    }

    let remaining = total_minutes.saturating_sub(before).saturating_sub(clamped);
    let shares = even_split(remaining, tail);
    for (activity, share) in court.activities[index + 1..].iter_mut().zip(shares) {
        // The clamp above keeps `remaining >= tail` except when the budget was
        // already short of the floor; hold the 1-minute floor either way.
        activity.duration_minutes = share.max(1);
    }
}

/// Remove the activity at `index` and give its time back to the rest.
pub fn remove_activity(court: &mut Court, index: usize, total_minutes: u32) {
    if index >= court.activities.len() {
        return;
    }
    court.activities.remove(index);
    redistribute_all(court, total_minutes);
}
