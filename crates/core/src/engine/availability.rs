//! Availability aggregation.
//!
//! [`AvailabilityEngine::eligible_slots`] is the single entry point. It picks
//! one of two modes from the query:
//!
//! - **Technician-pinned**: resolve the technician's effective slots, keep
//!   starts whose whole job fits inside them and ends by the technician close,
//!   apply the deadline gate, then drop starts that collide with the
//!   technician's existing bookings.
//! - **Any technician**: consume the pooled feed (already unioned across all
//!   qualifying technicians upstream), keep free starts whose job ends by the
//!   pooled close, apply the deadline gate and de-duplicate.
//!
//! In both modes an edited appointment keeps its original slot selectable.
//! Missing inputs are treated as empty, so the worst case is an empty list.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::{
    calendar::TimeSlot,
    engine::{
        conflict::{has_conflict, CandidateWindow},
        deadline::is_bookable,
        packer::{occupied_slots, required_slot_span},
        resolver::effective_slots,
        BookingPolicy,
    },
    errors::SlotError,
    models::{
        booking::{BookedWindow, CandidateBooking, PooledSlot, TechnicianSelector},
        schedule::{DateOverride, WeeklyTemplate},
    },
};

/// Everything the engine needs besides the query and the clock.
///
/// `None` and empty collections both mean "nothing known"; the caller decides
/// whether that is because the data does not exist or because it could not be
/// fetched.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityInputs {
    pub weekly_template: Option<WeeklyTemplate>,
    pub date_override: Option<DateOverride>,
    pub booked_windows: Vec<BookedWindow>,
    pub pooled_slots: Vec<PooledSlot>,
}

/// Bookable slots plus anything worth telling the caller about.
#[derive(Debug, Default)]
pub struct AvailabilityReport {
    pub slots: Vec<TimeSlot>,
    pub warnings: Vec<SlotError>,
}

impl AvailabilityReport {
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AvailabilityEngine {
    policy: BookingPolicy,
}

impl AvailabilityEngine {
    pub fn new(policy: BookingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }

    /// Bookable start slots for `booking` at `now`, ordered by clock time.
    pub fn eligible_slots(
        &self,
        booking: &CandidateBooking,
        inputs: &AvailabilityInputs,
        now: NaiveDateTime,
    ) -> AvailabilityReport {
        match booking.technician {
            TechnicianSelector::Specific(technician_id) => {
                self.technician_slots(technician_id, booking, inputs, now)
            }
            TechnicianSelector::Any => AvailabilityReport {
                slots: self.pooled_slots(booking, &inputs.pooled_slots, now),
                warnings: Vec::new(),
            },
        }
    }

    fn technician_slots(
        &self,
        technician_id: Uuid,
        booking: &CandidateBooking,
        inputs: &AvailabilityInputs,
        now: NaiveDateTime,
    ) -> AvailabilityReport {
        let date = booking.date;
        let resolved = effective_slots(
            technician_id,
            date,
            inputs.weekly_template.as_ref(),
            inputs.date_override.as_ref(),
        );
        let span = required_slot_span(&booking.service);
        let excluded = booking.excluded_appointment_id();

        let booked: Vec<BookedWindow> = inputs
            .booked_windows
            .iter()
            .filter(|w| w.technician_id == technician_id && w.date == date)
            .cloned()
            .collect();

        let mut slots: BTreeSet<TimeSlot> = resolved
            .slots
            .iter()
            .copied()
            .filter(|start| {
                occupied_slots(*start, span)
                    .is_some_and(|occupied| occupied.iter().all(|s| resolved.contains(*s)))
            })
            .filter(|start| {
                CandidateWindow::for_slot(date, *start, &booking.service)
                    .ends_by(self.policy.technician_close)
            })
            .filter(|start| is_bookable(date, *start, now, &self.policy))
            .filter(|start| {
                let window = CandidateWindow::for_slot(date, *start, &booking.service);
                !has_conflict(&window, &booked, excluded)
            })
            .collect();

        if let Some(original) = booking.preserved_slot_for(technician_id) {
            if slots.insert(original) {
                tracing::debug!(
                    "Re-injected original slot {} for edited appointment {:?}",
                    original,
                    excluded
                );
            }
        }

        tracing::debug!(
            "Technician {} on {}: {} effective slot(s) ({:?}), {} eligible",
            technician_id,
            date,
            resolved.slots.len(),
            resolved.origin,
            slots.len()
        );

        AvailabilityReport {
            slots: slots.into_iter().collect(),
            warnings: resolved.warning.into_iter().collect(),
        }
    }

    /// Bookable starts in any-technician mode.
    pub fn pooled_slots(
        &self,
        booking: &CandidateBooking,
        pooled: &[PooledSlot],
        now: NaiveDateTime,
    ) -> Vec<TimeSlot> {
        let date = booking.date;
        let excluded = booking.excluded_appointment_id();

        let mut slots: BTreeSet<TimeSlot> = pooled
            .iter()
            .filter(|entry| !entry.booked || (excluded.is_some() && entry.appointment_id == excluded))
            .map(|entry| entry.slot)
            .filter(|start| {
                CandidateWindow::for_slot(date, *start, &booking.service)
                    .ends_by(self.policy.pooled_close)
            })
            .filter(|start| is_bookable(date, *start, now, &self.policy))
            .collect();

        if let Some(original) = booking.preserved_slot() {
            slots.insert(original);
        }

        tracing::debug!(
            "Pooled availability on {}: {} entries, {} eligible",
            date,
            pooled.len(),
            slots.len()
        );

        slots.into_iter().collect()
    }
}

/// Convenience wrapper over [`AvailabilityEngine::eligible_slots`] with the
/// default policy.
pub fn eligible_slots(
    booking: &CandidateBooking,
    inputs: &AvailabilityInputs,
    now: NaiveDateTime,
) -> AvailabilityReport {
    AvailabilityEngine::default().eligible_slots(booking, inputs, now)
}
