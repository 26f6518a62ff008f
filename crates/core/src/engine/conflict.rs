//! Conflict detection between a candidate window and existing bookings.
//!
//! Windows are half-open, `[start, end)`: a booking ending at 11:00 does not
//! collide with one starting at 11:00.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::{
    calendar::{add_minutes, TimeSlot},
    models::{booking::BookedWindow, service::ServiceSpec},
};

/// The span a new or edited booking would occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl CandidateWindow {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self { date, start, end }
    }

    /// Window for `service` starting at `slot`.
    pub fn for_slot(date: NaiveDate, slot: TimeSlot, service: &ServiceSpec) -> Self {
        let start = slot.clock_time();
        Self {
            date,
            start,
            end: add_minutes(start, service.estimated_duration_minutes),
        }
    }

    /// Whether the window closes no later than `close`.
    pub fn ends_by(&self, close: NaiveTime) -> bool {
        self.end <= close
    }

    pub fn overlaps(&self, booked: &BookedWindow) -> bool {
        self.date == booked.date && self.start < booked.end_time && self.end > booked.start_time
    }
}

/// Whether `booked` occupies time for conflict purposes.
///
/// Cancelled windows and the appointment being edited never block.
fn blocks(booked: &BookedWindow, excluded: Option<Uuid>) -> bool {
    booked.is_active() && Some(booked.appointment_id) != excluded
}

/// Whether `candidate` overlaps any blocking window in `booked`.
pub fn has_conflict(candidate: &CandidateWindow, booked: &[BookedWindow], excluded: Option<Uuid>) -> bool {
    booked
        .iter()
        .any(|window| blocks(window, excluded) && candidate.overlaps(window))
}

/// Ids of the appointments `candidate` collides with, in input order.
pub fn conflicting_appointments(
    candidate: &CandidateWindow,
    booked: &[BookedWindow],
    excluded: Option<Uuid>,
) -> Vec<Uuid> {
    booked
        .iter()
        .filter(|window| blocks(window, excluded) && candidate.overlaps(window))
        .map(|window| window.appointment_id)
        .collect()
}
