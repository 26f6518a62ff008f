//! Collaborator contracts.
//!
//! Reads return `eyre::Result` because they cross an I/O boundary; the
//! calling layer decides how a failed read degrades. Writes return
//! `SlotResult` so that domain rejections (unknown appointment, double
//! booking) reach the caller unchanged.

use async_trait::async_trait;
use chrono::NaiveDate;
use eyre::Result;
use fieldbook_core::{
    errors::SlotResult,
    models::{
        booking::{AppointmentStatus, BookedWindow, PooledSlot, TechnicianSelector},
        schedule::{DateOverride, WeeklyTemplate},
        service::ServiceSpec,
    },
};
use uuid::Uuid;

use crate::models::BookingRequest;

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn weekly_template(&self, technician_id: Uuid) -> Result<Option<WeeklyTemplate>>;

    async fn date_override(
        &self,
        technician_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DateOverride>>;

    async fn update_weekly_template(
        &self,
        technician_id: Uuid,
        template: WeeklyTemplate,
    ) -> SlotResult<()>;

    /// Creates or replaces the override for its technician and date.
    async fn patch_date_override(&self, date_override: DateOverride) -> SlotResult<()>;

    /// Removes an override. Returns whether one existed.
    async fn clear_date_override(&self, technician_id: Uuid, date: NaiveDate) -> SlotResult<bool>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn booked_windows(
        &self,
        technician: TechnicianSelector,
        date: NaiveDate,
    ) -> Result<Vec<BookedWindow>>;

    /// Per-technician slot states for every technician qualified for the
    /// service, as served by the backend availability endpoint.
    async fn pooled_slots(&self, service_name: &str, date: NaiveDate) -> Result<Vec<PooledSlot>>;

    /// Stores a booking after re-checking it against the bookings present at
    /// commit time.
    async fn commit_booking(&self, request: BookingRequest) -> SlotResult<BookedWindow>;

    async fn set_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> SlotResult<BookedWindow>;
}

#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    async fn service_spec(&self, service_name: &str) -> Result<Option<ServiceSpec>>;
}
