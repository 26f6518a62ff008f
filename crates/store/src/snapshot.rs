use std::{fs, path::Path};

use eyre::{Result, WrapErr};
use fieldbook_core::models::{booking::BookedWindow, schedule::DateOverride};
use serde::{Deserialize, Serialize};

use crate::models::{ServiceRecord, TechnicianRecord};

/// Serialized contents of an [`InMemoryStore`](crate::InMemoryStore).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub technicians: Vec<TechnicianRecord>,
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
    #[serde(default)]
    pub overrides: Vec<DateOverride>,
    #[serde(default)]
    pub bookings: Vec<BookedWindow>,
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot> {
    let path = path.as_ref();
    tracing::debug!("Loading snapshot from {}", path.display());

    let raw = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("Invalid snapshot {}", path.display()))?;

    tracing::debug!(
        "Snapshot loaded: technicians={}, services={}, overrides={}, bookings={}",
        snapshot.technicians.len(),
        snapshot.services.len(),
        snapshot.overrides.len(),
        snapshot.bookings.len()
    );
    Ok(snapshot)
}

pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<()> {
    let path = path.as_ref();
    let raw = serde_json::to_string_pretty(snapshot).wrap_err("Failed to serialize snapshot")?;
    fs::write(path, raw).wrap_err_with(|| format!("Failed to write snapshot {}", path.display()))?;
    Ok(())
}
