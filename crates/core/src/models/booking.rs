use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    calendar::{add_minutes, TimeSlot},
    errors::SlotError,
    models::service::ServiceSpec,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

/// The occupied time span of an existing appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedWindow {
    pub technician_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
}

impl BookedWindow {
    /// A scheduled window starting at `slot` and lasting `duration_minutes`.
    pub fn at_slot(
        technician_id: Uuid,
        date: NaiveDate,
        slot: TimeSlot,
        duration_minutes: u32,
        appointment_id: Uuid,
    ) -> Self {
        let start_time = slot.clock_time();
        let end_time = add_minutes(start_time, duration_minutes);
        Self {
            technician_id,
            date,
            start_time,
            end_time,
            appointment_id,
            status: AppointmentStatus::Scheduled,
        }
    }

    pub fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }

    /// Cancelled windows no longer occupy time.
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }
}

/// One entry of the pre-aggregated any-technician feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PooledSlot {
    pub technician_id: Uuid,
    pub slot: TimeSlot,
    #[serde(default)]
    pub booked: bool,
    /// Appointment occupying the slot when `booked` is set.
    #[serde(default)]
    pub appointment_id: Option<Uuid>,
}

impl PooledSlot {
    pub fn free(technician_id: Uuid, slot: TimeSlot) -> Self {
        Self {
            technician_id,
            slot,
            booked: false,
            appointment_id: None,
        }
    }

    pub fn booked(technician_id: Uuid, slot: TimeSlot, appointment_id: Uuid) -> Self {
        Self {
            technician_id,
            slot,
            booked: true,
            appointment_id: Some(appointment_id),
        }
    }
}

/// Which technician a query is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechnicianSelector {
    Specific(Uuid),
    Any,
}

impl fmt::Display for TechnicianSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TechnicianSelector::Specific(id) => write!(f, "{}", id),
            TechnicianSelector::Any => f.write_str("any"),
        }
    }
}

impl FromStr for TechnicianSelector {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("any") {
            return Ok(TechnicianSelector::Any);
        }
        Uuid::parse_str(s)
            .map(TechnicianSelector::Specific)
            .map_err(|_| SlotError::Validation(format!("Invalid technician ID: {}", s)))
    }
}

/// The appointment being edited, if the query comes from an edit form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditContext {
    pub appointment_id: Uuid,
    pub original_technician_id: Uuid,
    pub original_date: NaiveDate,
    pub original_slot: TimeSlot,
}

/// The query passed to the availability engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateBooking {
    pub technician: TechnicianSelector,
    pub date: NaiveDate,
    pub service: ServiceSpec,
    #[serde(default)]
    pub editing: Option<EditContext>,
}

impl CandidateBooking {
    pub fn new(technician: TechnicianSelector, date: NaiveDate, service: ServiceSpec) -> Self {
        Self {
            technician,
            date,
            service,
            editing: None,
        }
    }

    pub fn with_edit(mut self, edit: EditContext) -> Self {
        self.editing = Some(edit);
        self
    }

    pub fn excluded_appointment_id(&self) -> Option<Uuid> {
        self.editing.map(|edit| edit.appointment_id)
    }

    /// The slot to keep selectable while editing, if it lies on the queried date.
    pub fn preserved_slot(&self) -> Option<TimeSlot> {
        self.editing
            .filter(|edit| edit.original_date == self.date)
            .map(|edit| edit.original_slot)
    }

    /// [`preserved_slot`](Self::preserved_slot), only when the edited
    /// appointment already belongs to `technician_id`.
    pub fn preserved_slot_for(&self, technician_id: Uuid) -> Option<TimeSlot> {
        self.editing
            .filter(|edit| edit.original_technician_id == technician_id)
            .and_then(|_| self.preserved_slot())
    }
}
