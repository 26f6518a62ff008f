use chrono::NaiveDate;
use fieldbook_core::{
    calendar::TimeSlot,
    models::{schedule::WeeklyTemplate, service::ServiceSpec},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianRecord {
    pub id: Uuid,
    pub name: String,
    /// Names of the services this technician is qualified for.
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub weekly_template: WeeklyTemplate,
}

impl TechnicianRecord {
    pub fn qualified_for(&self, service_name: &str) -> bool {
        self.services.iter().any(|s| s.eq_ignore_ascii_case(service_name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    #[serde(flatten)]
    pub spec: ServiceSpec,
}

/// A booking to commit. `appointment_id` is set when an existing
/// appointment is being moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub appointment_id: Option<Uuid>,
    pub technician_id: Uuid,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub duration_minutes: u32,
}
