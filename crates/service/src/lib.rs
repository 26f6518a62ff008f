//! # FieldBook Service
//!
//! The layer between callers (a booking form, an API handler, the
//! `slot-check` tool) and the pure availability engine.
//!
//! - **Config**: environment-driven settings and booking policy
//! - **Cache**: read-through cache for templates and service specs
//! - **Availability**: input resolution, graceful degradation and booking

/// Read-through cache owned by the calling layer
pub mod cache;
/// Configuration loaded from the environment
pub mod config;
/// Availability queries and booking commits
pub mod availability;

pub use availability::{AvailabilityService, SlotQuery};
pub use config::ServiceConfig;
