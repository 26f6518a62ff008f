//! `mockall` doubles of the collaborator contracts, for exercising failure
//! paths in callers.

use async_trait::async_trait;
use chrono::NaiveDate;
use fieldbook_core::{
    errors::SlotResult,
    models::{
        booking::{AppointmentStatus, BookedWindow, PooledSlot, TechnicianSelector},
        schedule::{DateOverride, WeeklyTemplate},
        service::ServiceSpec,
    },
};
use mockall::mock;
use uuid::Uuid;

use crate::{
    models::BookingRequest,
    repositories::{BookingRepository, ScheduleRepository, ServiceCatalog},
};

mock! {
    pub ScheduleRepo {}

    #[async_trait]
    impl ScheduleRepository for ScheduleRepo {
        async fn weekly_template(&self, technician_id: Uuid) -> eyre::Result<Option<WeeklyTemplate>>;

        async fn date_override(
            &self,
            technician_id: Uuid,
            date: NaiveDate,
        ) -> eyre::Result<Option<DateOverride>>;

        async fn update_weekly_template(
            &self,
            technician_id: Uuid,
            template: WeeklyTemplate,
        ) -> SlotResult<()>;

        async fn patch_date_override(&self, date_override: DateOverride) -> SlotResult<()>;

        async fn clear_date_override(&self, technician_id: Uuid, date: NaiveDate) -> SlotResult<bool>;
    }
}

mock! {
    pub BookingRepo {}

    #[async_trait]
    impl BookingRepository for BookingRepo {
        async fn booked_windows(
            &self,
            technician: TechnicianSelector,
            date: NaiveDate,
        ) -> eyre::Result<Vec<BookedWindow>>;

        async fn pooled_slots(&self, service_name: &str, date: NaiveDate) -> eyre::Result<Vec<PooledSlot>>;

        async fn commit_booking(&self, request: BookingRequest) -> SlotResult<BookedWindow>;

        async fn set_status(
            &self,
            appointment_id: Uuid,
            status: AppointmentStatus,
        ) -> SlotResult<BookedWindow>;
    }
}

mock! {
    pub ServiceCatalogRepo {}

    #[async_trait]
    impl ServiceCatalog for ServiceCatalogRepo {
        async fn service_spec(&self, service_name: &str) -> eyre::Result<Option<ServiceSpec>>;
    }
}
