//! # Slot Calendar
//!
//! The fixed grid of daily booking slots. Every working day has the same five
//! two-hour slots starting at 09:00 and ending at 19:00. Slots are ordered by
//! clock time and are parsed from (and formatted to) strings only at the
//! boundary of the system.

use std::{fmt, str::FromStr};

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{SlotError, SlotResult};

/// Number of slots in a working day.
pub const SLOTS_PER_DAY: usize = 5;

/// Nominal width of one slot in minutes.
pub const SLOT_MINUTES: i64 = 120;

/// One of the five fixed daily start times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeSlot {
    NineAM,
    ElevenAM,
    OnePM,
    ThreePM,
    FivePM,
}

impl TimeSlot {
    /// All slots in clock order.
    pub const ALL: [TimeSlot; SLOTS_PER_DAY] = [
        TimeSlot::NineAM,
        TimeSlot::ElevenAM,
        TimeSlot::OnePM,
        TimeSlot::ThreePM,
        TimeSlot::FivePM,
    ];

    pub fn all() -> impl Iterator<Item = TimeSlot> {
        Self::ALL.into_iter()
    }

    /// Position of the slot in the day, `0..=4`.
    pub fn ordinal(self) -> usize {
        match self {
            TimeSlot::NineAM => 0,
            TimeSlot::ElevenAM => 1,
            TimeSlot::OnePM => 2,
            TimeSlot::ThreePM => 3,
            TimeSlot::FivePM => 4,
        }
    }

    /// Slot at the given ordinal, if any.
    pub fn from_ordinal(ordinal: usize) -> Option<TimeSlot> {
        Self::ALL.get(ordinal).copied()
    }

    fn start_hour(self) -> u32 {
        9 + 2 * self.ordinal() as u32
    }

    /// Clock time at which the slot starts.
    pub fn clock_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.start_hour(), 0, 0).unwrap_or_default()
    }

    /// Clock time at which the slot's nominal width ends.
    pub fn end_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.start_hour() + 2, 0, 0).unwrap_or_default()
    }

    /// `HH:MM` form used on the wire.
    pub fn clock_str(self) -> &'static str {
        match self {
            TimeSlot::NineAM => "09:00",
            TimeSlot::ElevenAM => "11:00",
            TimeSlot::OnePM => "13:00",
            TimeSlot::ThreePM => "15:00",
            TimeSlot::FivePM => "17:00",
        }
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::NineAM => "9:00 AM",
            TimeSlot::ElevenAM => "11:00 AM",
            TimeSlot::OnePM => "1:00 PM",
            TimeSlot::ThreePM => "3:00 PM",
            TimeSlot::FivePM => "5:00 PM",
        }
    }

    /// Maps an exact clock time to its slot.
    ///
    /// Only the five canonical start times map; anything else, including
    /// times inside a slot, is `UnknownSlot`.
    pub fn from_clock_time(time: NaiveTime) -> SlotResult<TimeSlot> {
        Self::all()
            .find(|slot| slot.clock_time() == time)
            .ok_or_else(|| SlotError::UnknownSlot(time.format("%H:%M:%S").to_string()))
    }

    /// Parses `HH:MM`, `HH:MM:SS` or a display label such as `"1:00 PM"`.
    pub fn parse(input: &str) -> SlotResult<TimeSlot> {
        let trimmed = input.trim();

        if let Some(slot) = Self::all().find(|slot| slot.label().eq_ignore_ascii_case(trimmed)) {
            return Ok(slot);
        }

        let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|_| SlotError::UnknownSlot(input.to_string()))?;

        Self::from_clock_time(time).map_err(|_| SlotError::UnknownSlot(input.to_string()))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clock_str())
    }
}

impl FromStr for TimeSlot {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSlot::parse(s)
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = SlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TimeSlot::parse(&value)
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.clock_str().to_string()
    }
}

/// Adds minutes to a clock time, saturating at the last second of the day
/// instead of wrapping past midnight.
pub fn add_minutes(time: NaiveTime, minutes: u32) -> NaiveTime {
    let (end, wrapped) = time.overflowing_add_signed(chrono::Duration::minutes(i64::from(minutes)));
    if wrapped != 0 {
        NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(end)
    } else {
        end
    }
}

/// Working days. There is no weekend variant, so weekend dates never have
/// template availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WeekDay {
    pub fn from_chrono(weekday: Weekday) -> Option<WeekDay> {
        match weekday {
            Weekday::Mon => Some(WeekDay::Monday),
            Weekday::Tue => Some(WeekDay::Tuesday),
            Weekday::Wed => Some(WeekDay::Wednesday),
            Weekday::Thu => Some(WeekDay::Thursday),
            Weekday::Fri => Some(WeekDay::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }
}
