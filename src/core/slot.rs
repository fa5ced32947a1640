use chrono::{DateTime, Local, NaiveDate, TimeDelta};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::quantity::rate::KilowattHourRate;

/// A single price slot of the half-hourly tariff.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceSlot {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,

    #[serde(rename = "pence_per_kwh")]
    pub rate: KilowattHourRate,

    #[serde(rename = "vat_included")]
    pub includes_vat: bool,
}

impl PriceSlot {
    pub const DURATION: TimeDelta = TimeDelta::minutes(30);

    /// Build a half-hour slot starting at the specified time.
    pub fn half_hour(start: DateTime<Local>, rate: KilowattHourRate) -> Self {
        Self { start, end: start + Self::DURATION, rate, includes_vat: true }
    }

    /// Calendar date of the slot start in the local timezone.
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }
}

/// Check that each slot starts exactly when the previous one ends.
pub fn is_contiguous(slots: &[PriceSlot]) -> bool {
    slots.iter().tuple_windows().all(|(previous, next)| next.start == previous.end)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 12, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_contiguous_slots() {
        let slots = [
            PriceSlot::half_hour(at(0, 0), KilowattHourRate::ZERO),
            PriceSlot::half_hour(at(0, 30), KilowattHourRate::ZERO),
            PriceSlot::half_hour(at(1, 0), KilowattHourRate::ZERO),
        ];
        assert!(is_contiguous(&slots));
    }

    #[test]
    fn test_gap_in_slots() {
        let slots = [
            PriceSlot::half_hour(at(0, 0), KilowattHourRate::ZERO),
            PriceSlot::half_hour(at(1, 0), KilowattHourRate::ZERO),
        ];
        assert!(!is_contiguous(&slots));
    }

    #[test]
    fn test_single_and_empty_are_contiguous() {
        assert!(is_contiguous(&[]));
        assert!(is_contiguous(&[PriceSlot::half_hour(at(0, 0), KilowattHourRate::ZERO)]));
    }
}
