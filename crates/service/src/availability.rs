//! # Availability Service
//!
//! The calling layer around the pure engine. For each query it:
//!
//! 1. Looks up the service spec (through the read-through cache)
//! 2. Fetches the inputs the selected mode needs from the collaborators
//! 3. Degrades any failed fetch into an empty result plus a
//!    `MissingScheduleData` warning, so the caller can show a retryable
//!    "no availability" state instead of an error page
//! 4. Runs the engine with the caller's notion of "now"
//!
//! Booking goes through the same path and then commits through the booking
//! repository, which re-checks conflicts at commit time.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use fieldbook_core::{
    calendar::TimeSlot,
    errors::{DataSource, SlotError, SlotResult},
    models::{
        booking::{
            AppointmentStatus, BookedWindow, CandidateBooking, EditContext, TechnicianSelector,
        },
        schedule::{DateOverride, WeeklyTemplate},
        service::ServiceSpec,
    },
    AvailabilityEngine, AvailabilityInputs, AvailabilityReport,
};
use fieldbook_store::{
    models::BookingRequest,
    repositories::{BookingRepository, ScheduleRepository, ServiceCatalog},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{cache::ReadThroughCache, config::ServiceConfig};

/// A caller's availability question, before the service spec is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotQuery {
    pub service_name: String,
    pub technician: TechnicianSelector,
    pub date: NaiveDate,
    #[serde(default)]
    pub editing: Option<EditContext>,
}

impl SlotQuery {
    pub fn new(service_name: impl Into<String>, technician: TechnicianSelector, date: NaiveDate) -> Self {
        Self {
            service_name: service_name.into(),
            technician,
            date,
            editing: None,
        }
    }

    pub fn with_edit(mut self, edit: EditContext) -> Self {
        self.editing = Some(edit);
        self
    }
}

fn missing(origin: DataSource, err: eyre::Report) -> SlotError {
    SlotError::MissingScheduleData {
        origin,
        reason: format!("{:#}", err),
    }
}

pub struct AvailabilityService {
    schedules: Arc<dyn ScheduleRepository>,
    bookings: Arc<dyn BookingRepository>,
    catalog: Arc<dyn ServiceCatalog>,
    engine: AvailabilityEngine,
    templates: ReadThroughCache<Uuid, WeeklyTemplate>,
    services: ReadThroughCache<String, ServiceSpec>,
}

impl AvailabilityService {
    pub fn new(
        schedules: Arc<dyn ScheduleRepository>,
        bookings: Arc<dyn BookingRepository>,
        catalog: Arc<dyn ServiceCatalog>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            schedules,
            bookings,
            catalog,
            engine: AvailabilityEngine::new(config.policy.clone()),
            templates: ReadThroughCache::new(config.cache_enabled),
            services: ReadThroughCache::new(config.cache_enabled),
        }
    }

    /// Builds the service over a single store implementing every contract.
    pub fn with_store<S>(store: Arc<S>, config: &ServiceConfig) -> Self
    where
        S: ScheduleRepository + BookingRepository + ServiceCatalog + 'static,
    {
        Self::new(store.clone(), store.clone(), store, config)
    }

    async fn service_spec(&self, service_name: &str) -> eyre::Result<Option<ServiceSpec>> {
        let key = service_name.to_lowercase();
        self.services
            .get_or_fetch(&key, || self.catalog.service_spec(service_name))
            .await
    }

    /// Bookable slots for `query` as of `now`.
    ///
    /// # Errors
    ///
    /// * `SlotError::NotFound` - the service name is not in the catalog
    ///
    /// Collaborator failures are not errors; they produce an empty report
    /// carrying `MissingScheduleData` warnings.
    pub async fn eligible_slots(
        &self,
        query: &SlotQuery,
        now: NaiveDateTime,
    ) -> SlotResult<AvailabilityReport> {
        let spec = match self.service_spec(&query.service_name).await {
            Ok(Some(spec)) => spec,
            Ok(None) => {
                return Err(SlotError::NotFound(format!(
                    "Service {} not found",
                    query.service_name
                )));
            }
            Err(err) => return Ok(degraded(vec![missing(DataSource::ServiceCatalog, err)])),
        };

        let booking = CandidateBooking {
            technician: query.technician,
            date: query.date,
            service: spec,
            editing: query.editing,
        };

        let mut inputs = AvailabilityInputs::default();
        let mut warnings = Vec::new();

        match query.technician {
            TechnicianSelector::Specific(technician_id) => {
                match self
                    .templates
                    .get_or_fetch(&technician_id, || self.schedules.weekly_template(technician_id))
                    .await
                {
                    Ok(template) => inputs.weekly_template = template,
                    Err(err) => warnings.push(missing(DataSource::WeeklyTemplate, err)),
                }
                match self.schedules.date_override(technician_id, query.date).await {
                    Ok(date_override) => inputs.date_override = date_override,
                    Err(err) => warnings.push(missing(DataSource::DateOverride, err)),
                }
                match self.bookings.booked_windows(query.technician, query.date).await {
                    Ok(windows) => inputs.booked_windows = windows,
                    Err(err) => warnings.push(missing(DataSource::BookedWindows, err)),
                }
            }
            TechnicianSelector::Any => {
                match self.bookings.pooled_slots(&query.service_name, query.date).await {
                    Ok(pooled) => inputs.pooled_slots = pooled,
                    Err(err) => warnings.push(missing(DataSource::PooledSlots, err)),
                }
            }
        }

        if !warnings.is_empty() {
            return Ok(degraded(warnings));
        }

        let report = self.engine.eligible_slots(&booking, &inputs, now);
        for warning in &report.warnings {
            warn!("{}", warning);
        }
        debug!(
            "Eligible slots for {} / {} on {}: {:?}",
            query.service_name, query.technician, query.date, report.slots
        );
        Ok(report)
    }

    /// Books `slot` for `query`, or moves the edited appointment there.
    ///
    /// The slot must be eligible at `now`. In any-technician mode the
    /// qualified technicians free at that slot are tried in a stable order
    /// until one commit succeeds.
    ///
    /// # Errors
    ///
    /// * `SlotError::Validation` - the slot is not currently bookable
    /// * `SlotError::MissingScheduleData` - availability could not be determined
    /// * `SlotError::Conflict` - every candidate technician was taken at commit time
    pub async fn book(
        &self,
        query: &SlotQuery,
        slot: TimeSlot,
        now: NaiveDateTime,
    ) -> SlotResult<BookedWindow> {
        let mut report = self.eligible_slots(query, now).await?;

        if !report.slots.contains(&slot) {
            if let Some(index) = report.warnings.iter().position(|w| {
                matches!(w, SlotError::MissingScheduleData { .. })
            }) {
                return Err(report.warnings.swap_remove(index));
            }
            return Err(SlotError::Validation(format!(
                "Slot {} on {} is not available for {}",
                slot, query.date, query.service_name
            )));
        }

        let duration_minutes = match self.service_spec(&query.service_name).await? {
            Some(spec) => spec.estimated_duration_minutes,
            None => {
                return Err(SlotError::NotFound(format!(
                    "Service {} not found",
                    query.service_name
                )));
            }
        };
        let appointment_id = query.editing.map(|edit| edit.appointment_id);

        let candidates = match query.technician {
            TechnicianSelector::Specific(technician_id) => vec![technician_id],
            TechnicianSelector::Any => {
                let mut ids: Vec<Uuid> = self
                    .bookings
                    .pooled_slots(&query.service_name, query.date)
                    .await?
                    .into_iter()
                    .filter(|p| p.slot == slot)
                    .filter(|p| !p.booked || (appointment_id.is_some() && p.appointment_id == appointment_id))
                    .map(|p| p.technician_id)
                    .collect();
                ids.sort();
                ids.dedup();
                ids
            }
        };

        let mut conflicts = Vec::new();
        for technician_id in candidates {
            let request = BookingRequest {
                appointment_id,
                technician_id,
                date: query.date,
                slot,
                duration_minutes,
            };
            match self.bookings.commit_booking(request).await {
                Ok(window) => {
                    info!(
                        "Booked {} for {} with technician {} at {} {}",
                        window.appointment_id, query.service_name, technician_id, query.date, slot
                    );
                    return Ok(window);
                }
                Err(SlotError::Conflict(ids)) => {
                    debug!("Technician {} taken at commit time: {:?}", technician_id, ids);
                    conflicts.extend(ids);
                }
                Err(err) => return Err(err),
            }
        }

        Err(SlotError::Conflict(conflicts))
    }

    pub async fn cancel(&self, appointment_id: Uuid) -> SlotResult<BookedWindow> {
        self.bookings
            .set_status(appointment_id, AppointmentStatus::Cancelled)
            .await
    }

    /// Replaces a technician's weekly template and drops the cached copy.
    pub async fn update_weekly_template(
        &self,
        technician_id: Uuid,
        template: WeeklyTemplate,
    ) -> SlotResult<()> {
        self.schedules
            .update_weekly_template(technician_id, template)
            .await?;
        self.templates.invalidate(&technician_id).await;
        Ok(())
    }

    pub async fn patch_date_override(&self, date_override: DateOverride) -> SlotResult<()> {
        self.schedules.patch_date_override(date_override).await
    }

    pub async fn clear_date_override(&self, technician_id: Uuid, date: NaiveDate) -> SlotResult<bool> {
        self.schedules.clear_date_override(technician_id, date).await
    }
}

fn degraded(warnings: Vec<SlotError>) -> AvailabilityReport {
    for warning in &warnings {
        warn!("{}", warning);
    }
    AvailabilityReport {
        slots: Vec::new(),
        warnings,
    }
}
