//! Booking deadline gate.
//!
//! Morning slots must be booked by the evening before; afternoon slots by the
//! morning of the same day.

use chrono::{NaiveDate, NaiveDateTime};

use crate::{calendar::TimeSlot, engine::BookingPolicy};

/// The last moment at which `slot` on `date` may still be booked.
pub fn cutoff(date: NaiveDate, slot: TimeSlot, policy: &BookingPolicy) -> NaiveDateTime {
    if slot < policy.same_day_from {
        let prior_day = date.pred_opt().unwrap_or(date);
        prior_day.and_time(policy.prior_day_cutoff)
    } else {
        date.and_time(policy.same_day_cutoff)
    }
}

/// Whether `slot` on `date` can still be booked at `now`.
///
/// Both the cutoff and the slot's own start time must lie at or after `now`.
pub fn is_bookable(date: NaiveDate, slot: TimeSlot, now: NaiveDateTime, policy: &BookingPolicy) -> bool {
    let before_cutoff = now <= cutoff(date, slot, policy);
    let not_started = date.and_time(slot.clock_time()) >= now;
    before_cutoff && not_started
}
