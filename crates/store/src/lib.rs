//! # FieldBook Store
//!
//! Collaborator contracts for the availability engine and an in-memory
//! implementation of them. The traits in [`repositories`] describe the data
//! the engine consumes; [`memory::InMemoryStore`] backs them with a snapshot
//! loaded from JSON and serializes booking commits so that a double booking
//! is caught at commit time. [`mock`] provides `mockall` doubles for tests.

pub mod memory;
pub mod mock;
pub mod models;
pub mod repositories;
pub mod snapshot;

pub use memory::InMemoryStore;
pub use snapshot::{load_snapshot, Snapshot};
