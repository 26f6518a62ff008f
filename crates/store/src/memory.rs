use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use eyre::Result;
use fieldbook_core::{
    calendar::{add_minutes, WeekDay},
    engine::{
        conflict::{conflicting_appointments, CandidateWindow},
        packer::{occupied_slots, span_for_minutes},
        resolver::effective_slots,
    },
    errors::{SlotError, SlotResult},
    models::{
        booking::{AppointmentStatus, BookedWindow, PooledSlot, TechnicianSelector},
        schedule::{DateOverride, WeeklyTemplate},
        service::ServiceSpec,
    },
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    models::{BookingRequest, ServiceRecord, TechnicianRecord},
    repositories::{BookingRepository, ScheduleRepository, ServiceCatalog},
    snapshot::Snapshot,
};

#[derive(Debug, Default)]
struct StoreState {
    technicians: BTreeMap<Uuid, TechnicianRecord>,
    services: BTreeMap<String, ServiceSpec>,
    overrides: HashMap<(Uuid, NaiveDate), DateOverride>,
    bookings: Vec<BookedWindow>,
}

impl StoreState {
    fn require_technician(&self, technician_id: Uuid) -> SlotResult<&TechnicianRecord> {
        self.technicians
            .get(&technician_id)
            .ok_or_else(|| SlotError::NotFound(format!("Technician with ID {} not found", technician_id)))
    }

    /// Whether every slot the request would occupy is a working slot of its
    /// technician on that date.
    fn covers(&self, request: &BookingRequest) -> bool {
        let Some(technician) = self.technicians.get(&request.technician_id) else {
            return false;
        };
        let resolved = effective_slots(
            technician.id,
            request.date,
            Some(&technician.weekly_template),
            self.overrides.get(&(technician.id, request.date)),
        );
        occupied_slots(request.slot, span_for_minutes(request.duration_minutes))
            .is_some_and(|occupied| occupied.iter().all(|slot| resolved.contains(*slot)))
    }

    fn technician_bookings(&self, technician_id: Uuid, date: NaiveDate) -> Vec<BookedWindow> {
        self.bookings
            .iter()
            .filter(|w| w.technician_id == technician_id && w.date == date)
            .cloned()
            .collect()
    }
}

/// Snapshot-backed implementation of every collaborator contract.
///
/// All mutation happens under a single write lock, which is what makes the
/// commit-time conflict check in [`BookingRepository::commit_booking`]
/// authoritative.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut state = StoreState::default();
        for technician in snapshot.technicians {
            state.technicians.insert(technician.id, technician);
        }
        for service in snapshot.services {
            state.services.insert(service.name.to_lowercase(), service.spec);
        }
        for date_override in snapshot.overrides {
            state
                .overrides
                .insert((date_override.technician_id, date_override.date), date_override);
        }
        state.bookings = snapshot.bookings;

        Self {
            state: RwLock::new(state),
        }
    }

    /// Exports the current contents.
    pub async fn snapshot(&self) -> Snapshot {
        let state = self.state.read().await;
        Snapshot {
            technicians: state.technicians.values().cloned().collect(),
            services: state
                .services
                .iter()
                .map(|(name, spec)| ServiceRecord {
                    name: name.clone(),
                    spec: spec.clone(),
                })
                .collect(),
            overrides: state.overrides.values().cloned().collect(),
            bookings: state.bookings.clone(),
        }
    }

    pub async fn add_technician(&self, technician: TechnicianRecord) {
        let mut state = self.state.write().await;
        tracing::debug!("Adding technician: id={}, name={}", technician.id, technician.name);
        state.technicians.insert(technician.id, technician);
    }

    pub async fn add_service(&self, name: &str, spec: ServiceSpec) {
        let mut state = self.state.write().await;
        state.services.insert(name.to_lowercase(), spec);
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryStore {
    async fn weekly_template(&self, technician_id: Uuid) -> Result<Option<WeeklyTemplate>> {
        let state = self.state.read().await;
        Ok(state
            .technicians
            .get(&technician_id)
            .map(|t| t.weekly_template.clone()))
    }

    async fn date_override(
        &self,
        technician_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<DateOverride>> {
        let state = self.state.read().await;
        Ok(state.overrides.get(&(technician_id, date)).cloned())
    }

    async fn update_weekly_template(
        &self,
        technician_id: Uuid,
        template: WeeklyTemplate,
    ) -> SlotResult<()> {
        let mut state = self.state.write().await;
        state.require_technician(technician_id)?;
        if let Some(technician) = state.technicians.get_mut(&technician_id) {
            technician.weekly_template = template;
        }
        tracing::info!("Weekly template updated: technician={}", technician_id);
        Ok(())
    }

    async fn patch_date_override(&self, date_override: DateOverride) -> SlotResult<()> {
        let mut state = self.state.write().await;
        state.require_technician(date_override.technician_id)?;
        tracing::info!(
            "Date override set: technician={}, date={}, slots={}",
            date_override.technician_id,
            date_override.date,
            date_override.slots.len()
        );
        state
            .overrides
            .insert((date_override.technician_id, date_override.date), date_override);
        Ok(())
    }

    async fn clear_date_override(&self, technician_id: Uuid, date: NaiveDate) -> SlotResult<bool> {
        let mut state = self.state.write().await;
        state.require_technician(technician_id)?;
        Ok(state.overrides.remove(&(technician_id, date)).is_some())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn booked_windows(
        &self,
        technician: TechnicianSelector,
        date: NaiveDate,
    ) -> Result<Vec<BookedWindow>> {
        let state = self.state.read().await;
        let windows = state
            .bookings
            .iter()
            .filter(|w| w.date == date)
            .filter(|w| match technician {
                TechnicianSelector::Specific(id) => w.technician_id == id,
                TechnicianSelector::Any => true,
            })
            .cloned()
            .collect();
        Ok(windows)
    }

    async fn pooled_slots(&self, service_name: &str, date: NaiveDate) -> Result<Vec<PooledSlot>> {
        let state = self.state.read().await;
        let mut pooled = Vec::new();

        for technician in state
            .technicians
            .values()
            .filter(|t| t.qualified_for(service_name))
        {
            let resolved = effective_slots(
                technician.id,
                date,
                Some(&technician.weekly_template),
                state.overrides.get(&(technician.id, date)),
            );
            for slot in resolved.slots {
                let nominal = CandidateWindow::new(date, slot.clock_time(), slot.end_time());
                let occupant = state.bookings.iter().find(|w| {
                    w.technician_id == technician.id && w.is_active() && nominal.overlaps(w)
                });
                pooled.push(match occupant {
                    Some(w) => PooledSlot::booked(technician.id, slot, w.appointment_id),
                    None => PooledSlot::free(technician.id, slot),
                });
            }
        }

        tracing::debug!(
            "Pooled slots for {} on {}: {} entries",
            service_name,
            date,
            pooled.len()
        );
        Ok(pooled)
    }

    async fn commit_booking(&self, request: BookingRequest) -> SlotResult<BookedWindow> {
        let mut state = self.state.write().await;
        state.require_technician(request.technician_id)?;

        if WeekDay::from_chrono(request.date.weekday()).is_none() {
            return Err(SlotError::Validation(format!(
                "{} is not a working day",
                request.date
            )));
        }

        let unchanged_placement = request.appointment_id.is_some_and(|id| {
            state.bookings.iter().any(|w| {
                w.appointment_id == id
                    && w.technician_id == request.technician_id
                    && w.date == request.date
                    && w.start_time == request.slot.clock_time()
            })
        });
        if !unchanged_placement && !state.covers(&request) {
            return Err(SlotError::Validation(format!(
                "Technician {} does not work {} minutes from {} on {}",
                request.technician_id, request.duration_minutes, request.slot, request.date
            )));
        }

        let start = request.slot.clock_time();
        let candidate = CandidateWindow::new(
            request.date,
            start,
            add_minutes(start, request.duration_minutes),
        );
        let existing = state.technician_bookings(request.technician_id, request.date);
        let conflicts = conflicting_appointments(&candidate, &existing, request.appointment_id);
        if !conflicts.is_empty() {
            tracing::warn!(
                "Rejected booking for technician {} at {} {}: conflicts with {:?}",
                request.technician_id,
                request.date,
                request.slot,
                conflicts
            );
            return Err(SlotError::Conflict(conflicts));
        }

        let window = match request.appointment_id {
            Some(appointment_id) => {
                let booking = state
                    .bookings
                    .iter_mut()
                    .find(|w| w.appointment_id == appointment_id)
                    .ok_or_else(|| {
                        SlotError::NotFound(format!("Appointment with ID {} not found", appointment_id))
                    })?;
                booking.technician_id = request.technician_id;
                booking.date = request.date;
                booking.start_time = candidate.start;
                booking.end_time = candidate.end;
                booking.clone()
            }
            None => {
                let window = BookedWindow::at_slot(
                    request.technician_id,
                    request.date,
                    request.slot,
                    request.duration_minutes,
                    Uuid::new_v4(),
                );
                state.bookings.push(window.clone());
                window
            }
        };

        tracing::info!(
            "Booking committed: appointment={}, technician={}, date={}, slot={}",
            window.appointment_id,
            window.technician_id,
            window.date,
            request.slot
        );
        Ok(window)
    }

    async fn set_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> SlotResult<BookedWindow> {
        let mut state = self.state.write().await;
        let index = state
            .bookings
            .iter()
            .position(|w| w.appointment_id == appointment_id)
            .ok_or_else(|| {
                SlotError::NotFound(format!("Appointment with ID {} not found", appointment_id))
            })?;

        let current = state.bookings[index].clone();
        if !current.is_active() && status != AppointmentStatus::Cancelled {
            // Reinstating a cancelled booking must not overlap what was booked since.
            let candidate = CandidateWindow::new(current.date, current.start_time, current.end_time);
            let existing = state.technician_bookings(current.technician_id, current.date);
            let conflicts = conflicting_appointments(&candidate, &existing, Some(appointment_id));
            if !conflicts.is_empty() {
                return Err(SlotError::Conflict(conflicts));
            }
        }

        state.bookings[index].status = status;
        tracing::info!("Appointment {} status changed to {:?}", appointment_id, status);
        Ok(state.bookings[index].clone())
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryStore {
    async fn service_spec(&self, service_name: &str) -> Result<Option<ServiceSpec>> {
        let state = self.state.read().await;
        Ok(state.services.get(&service_name.to_lowercase()).cloned())
    }
}
