//! # FieldBook Core
//!
//! Appointment slot scheduling for field-service technicians. This crate
//! holds the domain model, the fixed slot calendar and the pure availability
//! engine. It performs no I/O; see `fieldbook-store` for the collaborator
//! contracts and `fieldbook-service` for the calling layer.

pub mod calendar;
pub mod engine;
pub mod errors;
pub mod models;

pub use calendar::{TimeSlot, WeekDay};
pub use engine::{
    availability::{eligible_slots, AvailabilityEngine, AvailabilityInputs, AvailabilityReport},
    BookingPolicy,
};
pub use errors::{SlotError, SlotResult};
