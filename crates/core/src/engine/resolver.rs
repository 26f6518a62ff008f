//! Schedule resolution: the working slots of one technician on one date.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::{
    calendar::{TimeSlot, WeekDay},
    errors::SlotError,
    models::schedule::{DateOverride, WeeklyTemplate},
};

/// Where a technician's effective slots came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOrigin {
    DateOverride,
    WeeklyTemplate,
    /// Weekend, or no template entry for the weekday.
    NoSchedule,
}

#[derive(Debug)]
pub struct EffectiveSlots {
    pub slots: BTreeSet<TimeSlot>,
    pub origin: SlotOrigin,
    /// Set when a malformed override had to be normalized.
    pub warning: Option<SlotError>,
}

impl EffectiveSlots {
    fn none() -> Self {
        Self {
            slots: BTreeSet::new(),
            origin: SlotOrigin::NoSchedule,
            warning: None,
        }
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        self.slots.contains(&slot)
    }
}

/// Resolves the working slots of `technician_id` on `date`.
///
/// An override for exactly this technician and date replaces the weekly
/// template entirely, and an empty override means a day off. Without an
/// override the template entry for the date's weekday applies. A missing
/// template behaves like an empty one.
pub fn effective_slots(
    technician_id: Uuid,
    date: NaiveDate,
    template: Option<&WeeklyTemplate>,
    date_override: Option<&DateOverride>,
) -> EffectiveSlots {
    let applicable = date_override
        .filter(|o| o.technician_id == technician_id && o.date == date);

    if let Some(o) = applicable {
        let warning = override_issue(o).map(|detail| SlotError::InvalidOverrideState {
            technician_id,
            date,
            detail,
        });
        if let Some(warning) = &warning {
            tracing::debug!("{}", warning);
        }
        return EffectiveSlots {
            slots: o.normalized_slots(),
            origin: SlotOrigin::DateOverride,
            warning,
        };
    }

    let Some(day) = WeekDay::from_chrono(date.weekday()) else {
        return EffectiveSlots::none();
    };

    match template.and_then(|t| t.slots_for(day)) {
        Some(slots) => EffectiveSlots {
            slots: slots.clone(),
            origin: SlotOrigin::WeeklyTemplate,
            warning: None,
        },
        None => EffectiveSlots::none(),
    }
}

fn override_issue(date_override: &DateOverride) -> Option<String> {
    if date_override.is_normalized() {
        return None;
    }
    let distinct = date_override.normalized_slots().len();
    if distinct < date_override.slots.len() {
        Some(format!(
            "{} duplicate slot(s) removed",
            date_override.slots.len() - distinct
        ))
    } else {
        Some("slots were out of order".to_string())
    }
}
