use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::{TimeSlot, WeekDay};

/// A technician's recurring Monday to Friday availability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyTemplate {
    days: BTreeMap<WeekDay, BTreeSet<TimeSlot>>,
}

impl WeeklyTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, day: WeekDay, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        self.set_day(day, slots);
        self
    }

    /// Replaces the slots for one weekday. An empty set removes the entry.
    pub fn set_day(&mut self, day: WeekDay, slots: impl IntoIterator<Item = TimeSlot>) {
        let slots: BTreeSet<TimeSlot> = slots.into_iter().collect();
        if slots.is_empty() {
            self.days.remove(&day);
        } else {
            self.days.insert(day, slots);
        }
    }

    pub fn slots_for(&self, day: WeekDay) -> Option<&BTreeSet<TimeSlot>> {
        self.days.get(&day)
    }
}

/// A one-off replacement of a technician's availability on one date.
///
/// The slot list is kept as received so that malformed input (unsorted or
/// duplicated slots) can be detected and reported when it is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub technician_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub slots: Vec<TimeSlot>,
}

impl DateOverride {
    pub fn new(technician_id: Uuid, date: NaiveDate, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        Self {
            technician_id,
            date,
            slots: slots.into_iter().collect(),
        }
    }

    /// An explicit "no availability" override.
    pub fn day_off(technician_id: Uuid, date: NaiveDate) -> Self {
        Self::new(technician_id, date, [])
    }

    /// Whether the stored slots are strictly increasing.
    pub fn is_normalized(&self) -> bool {
        self.slots.windows(2).all(|pair| pair[0] < pair[1])
    }

    /// Sorted, de-duplicated slots.
    pub fn normalized_slots(&self) -> BTreeSet<TimeSlot> {
        self.slots.iter().copied().collect()
    }
}
