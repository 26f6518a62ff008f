//! Duration packing: how many contiguous slots a job occupies and where it
//! can start.

use crate::{
    calendar::{SLOT_MINUTES, SLOTS_PER_DAY, TimeSlot},
    models::service::ServiceSpec,
};

/// Number of contiguous slots a booking for `service` occupies.
///
/// `ceil(minutes / 120)`, never less than one and never more than a full day.
pub fn required_slot_span(service: &ServiceSpec) -> usize {
    span_for_minutes(service.estimated_duration_minutes)
}

/// Slot span of a job lasting `minutes`.
pub fn span_for_minutes(minutes: u32) -> usize {
    (minutes as usize)
        .div_ceil(SLOT_MINUTES as usize)
        .clamp(1, SLOTS_PER_DAY)
}

/// Whether a job spanning `span` slots can start at `start` without running
/// past the last slot of the day.
pub fn fits(start: TimeSlot, span: usize) -> bool {
    start.ordinal() + span <= SLOTS_PER_DAY
}

/// The slots a booking starting at `start` would occupy, or `None` when it
/// does not fit.
pub fn occupied_slots(start: TimeSlot, span: usize) -> Option<Vec<TimeSlot>> {
    if span == 0 || !fits(start, span) {
        return None;
    }
    (start.ordinal()..start.ordinal() + span)
        .map(TimeSlot::from_ordinal)
        .collect()
}

/// Start slots from `slots` that are structurally able to host `span` slots.
pub fn structural_starts(slots: impl IntoIterator<Item = TimeSlot>, span: usize) -> Vec<TimeSlot> {
    let mut starts: Vec<TimeSlot> = slots.into_iter().filter(|slot| fits(*slot, span)).collect();
    starts.sort();
    starts.dedup();
    starts
}
