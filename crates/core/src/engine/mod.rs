//! # Availability Engine
//!
//! Pure functions that turn schedules, overrides and existing bookings into
//! the list of slots a customer may book. Nothing in this module performs I/O,
//! caches data or keeps state between calls; the caller resolves every input
//! beforehand and passes the current time explicitly.
//!
//! The pipeline for a technician-pinned query is:
//!
//! 1. [`resolver`] merges the weekly template with a date override
//! 2. [`packer`] keeps starts with enough trailing slots for the job
//! 3. [`deadline`] drops slots whose booking cutoff has passed
//! 4. [`conflict`] drops slots overlapping an existing booking
//!
//! [`availability`] runs the pipeline and also implements the pooled
//! "any technician" mode.

pub mod availability;
pub mod conflict;
pub mod deadline;
pub mod packer;
pub mod resolver;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::calendar::TimeSlot;

/// Business rules that parameterize the engine.
///
/// A single technician's day closes at 17:00; the company-wide pooled window
/// closes at 18:00.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingPolicy {
    /// Latest end time for a window booked against one technician.
    pub technician_close: NaiveTime,
    /// Latest end time for a window offered in any-technician mode.
    pub pooled_close: NaiveTime,
    /// Cutoff on the prior day for morning slots.
    pub prior_day_cutoff: NaiveTime,
    /// Cutoff on the same day for afternoon slots.
    pub same_day_cutoff: NaiveTime,
    /// First slot that uses the same-day cutoff.
    pub same_day_from: TimeSlot,
}

impl BookingPolicy {
    pub const TECHNICIAN_CLOSE: (u32, u32) = (17, 0);
    pub const POOLED_CLOSE: (u32, u32) = (18, 0);
}

impl Default for BookingPolicy {
    fn default() -> Self {
        let at = |(h, m): (u32, u32)| NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
        Self {
            technician_close: at(Self::TECHNICIAN_CLOSE),
            pooled_close: at(Self::POOLED_CLOSE),
            prior_day_cutoff: at((17, 0)),
            same_day_cutoff: at((9, 0)),
            same_day_from: TimeSlot::OnePM,
        }
    }
}
