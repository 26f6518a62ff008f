use serde::{Deserialize, Serialize};

/// Per-service metadata used to size a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub estimated_duration_minutes: u32,
    pub job_type: String,
}

impl ServiceSpec {
    pub fn new(estimated_duration_minutes: u32, job_type: impl Into<String>) -> Self {
        Self {
            estimated_duration_minutes,
            job_type: job_type.into(),
        }
    }
}
