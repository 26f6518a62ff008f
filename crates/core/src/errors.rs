use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Upstream collaborator whose data feeds the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    WeeklyTemplate,
    DateOverride,
    BookedWindows,
    PooledSlots,
    ServiceCatalog,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataSource::WeeklyTemplate => "weekly template",
            DataSource::DateOverride => "date override",
            DataSource::BookedWindows => "booked windows",
            DataSource::PooledSlots => "pooled slots",
            DataSource::ServiceCatalog => "service catalog",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Unknown time slot: {0}")]
    UnknownSlot(String),

    #[error("Schedule data unavailable from {origin}: {reason}")]
    MissingScheduleData { origin: DataSource, reason: String },

    #[error("Override for technician {technician_id} on {date} was normalized: {detail}")]
    InvalidOverrideState {
        technician_id: Uuid,
        date: NaiveDate,
        detail: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Booking conflicts with existing appointments: {0:?}")]
    Conflict(Vec<Uuid>),

    #[error("Storage error: {0}")]
    Storage(#[from] eyre::Report),
}

impl SlotError {
    /// Errors that degrade availability instead of failing the request.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            SlotError::MissingScheduleData { .. } | SlotError::InvalidOverrideState { .. }
        )
    }
}

pub type SlotResult<T> = Result<T, SlotError>;
