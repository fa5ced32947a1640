use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use chrono::{DateTime, Datelike, Local, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::prelude::*;

/// Wall-clock time in the `HH:MM` format.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Build a constant time of day.
    ///
    /// # Panics
    ///
    /// On an invalid hour or minute, which breaks the build when evaluated in a constant.
    pub const fn hm(hour: u32, minute: u32) -> Self {
        match NaiveTime::from_hms_opt(hour, minute, 0) {
            Some(time) => Self(time),
            None => panic!("invalid time of day"),
        }
    }

    fn minute_of_day(self) -> u32 {
        self.0.hour() * 60 + self.0.minute()
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map(Self)
            .with_context(|| format!("`{s}` is not a valid `HH:MM` time"))
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

/// Recurring daily time window, optionally restricted to some days of the week.
#[serde_as]
#[must_use]
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub start: TimeOfDay,

    /// Exclusive. A window ending before it starts wraps past midnight.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub end: TimeOfDay,

    /// ISO weekdays: 1 is Monday, 7 is Sunday. Empty means every day.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<u32>,
}

impl TimeWindow {
    pub const fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end, days_of_week: Vec::new() }
    }

    pub fn on_days(mut self, days_of_week: impl IntoIterator<Item = u32>) -> Self {
        self.days_of_week = days_of_week.into_iter().collect();
        self
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end.minute_of_day() < self.start.minute_of_day()
    }

    /// Check whether the timestamp falls into the window.
    pub fn contains(&self, timestamp: DateTime<Local>) -> bool {
        if !self.days_of_week.is_empty()
            && !self.days_of_week.contains(&timestamp.weekday().number_from_monday())
        {
            return false;
        }
        let minute = timestamp.hour() * 60 + timestamp.minute();
        let (start, end) = (self.start.minute_of_day(), self.end.minute_of_day());
        if self.wraps_midnight() {
            // Either the evening part or the early-morning part:
            minute >= start || minute < end
        } else {
            start <= minute && minute < end
        }
    }
}

impl Display for TimeWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}–{}", self.start, self.end)?;
        if !self.days_of_week.is_empty() {
            write!(f, " on {:?}", self.days_of_week)?;
        }
        Ok(())
    }
}

/// Check whether the timestamp falls into any of the windows.
pub fn any_contains(windows: &[TimeWindow], timestamp: DateTime<Local>) -> bool {
    windows.iter().any(|window| window.contains(timestamp))
}
