use bon::Builder;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        appliance::{Appliance, ControlType},
        household::Household,
        slot::PriceSlot,
        time_window::{TimeOfDay, TimeWindow, any_contains},
    },
    quantity::rate::KilowattHourRate,
};

/// Scheduling constraints of a single appliance run.
#[must_use]
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct Constraints {
    /// Slot must start in one of these windows, unless empty.
    #[builder(default)]
    #[serde(default)]
    pub allowed: Vec<TimeWindow>,

    #[builder(default)]
    #[serde(default)]
    pub blocked: Vec<TimeWindow>,

    /// Only apply to noisy appliances.
    #[builder(default)]
    #[serde(default)]
    pub quiet_hours: Vec<TimeWindow>,

    pub finish_by: Option<DateTime<Local>>,
    pub start_by: Option<DateTime<Local>>,
    pub price_cap: Option<KilowattHourRate>,

    #[builder(default = 1)]
    #[serde(default)]
    pub noise_level: u8,
}

impl Default for Constraints {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Constraints {
    /// Noise level from which the quiet hours are respected.
    pub const NOISY_LEVEL: u8 = 3;

    /// Assume somebody is awake to press the button during these hours.
    pub const DEFAULT_AVAILABLE_HOURS: (TimeOfDay, TimeOfDay) =
        (TimeOfDay::hm(7, 0), TimeOfDay::hm(23, 30));

    /// Collect the raw constraints of the appliance in the household.
    pub fn for_appliance(appliance: &Appliance, household: &Household) -> Self {
        Self {
            allowed: appliance.allowed_windows.clone(),
            blocked: appliance
                .blocked_windows
                .iter()
                .chain(&household.blocked_windows)
                .cloned()
                .collect(),
            quiet_hours: household.quiet_hours.clone(),
            finish_by: appliance.finish_by,
            start_by: appliance.start_by,
            price_cap: appliance.price_cap,
            noise_level: appliance.noise_level,
        }
    }

    /// Restrict the start time to when it is practical to start the appliance.
    ///
    /// A manually controlled appliance needs somebody to press the button, but only the start
    /// has to fall into the available hours: the run may well finish later.
    /// A smart appliance is loaded any time and gets started automatically, so nothing changes.
    pub fn apply_practical(&mut self, appliance: &Appliance, household: &Household) {
        match appliance.control_type {
            ControlType::Manual if household.available_hours.is_empty() => {
                let (start, end) = Self::DEFAULT_AVAILABLE_HOURS;
                self.allowed = vec![TimeWindow::new(start, end).on_days(1..=7)];
            }
            ControlType::Manual => {
                self.allowed.clone_from(&household.available_hours);
            }
            ControlType::Smart => {}
        }
    }

    /// Same as [`Constraints::apply_practical`] but consumes and returns the constraints.
    pub fn with_practical(mut self, appliance: &Appliance, household: &Household) -> Self {
        self.apply_practical(appliance, household);
        self
    }

    /// Check whether the slot satisfies all the constraints.
    #[must_use]
    pub fn admits(&self, slot: &PriceSlot) -> bool {
        if self.price_cap.is_some_and(|price_cap| slot.rate > price_cap) {
            return false;
        }
        if !self.allowed.is_empty() && !any_contains(&self.allowed, slot.start) {
            return false;
        }
        if any_contains(&self.blocked, slot.start) {
            return false;
        }
        if self.noise_level >= Self::NOISY_LEVEL && any_contains(&self.quiet_hours, slot.start) {
            return false;
        }
        if self.start_by.is_some_and(|start_by| slot.start > start_by) {
            return false;
        }
        if self.finish_by.is_some_and(|finish_by| slot.end > finish_by) {
            return false;
        }
        true
    }

    /// Keep only the slots satisfying all the constraints, preserving the order.
    pub fn filter(&self, slots: &[PriceSlot]) -> Vec<PriceSlot> {
        slots.iter().filter(|slot| self.admits(slot)).copied().collect()
    }
}

/// Reduce the price timeline to the slots usable under the constraints.
pub fn filter_by_constraints(slots: &[PriceSlot], constraints: &Constraints) -> Vec<PriceSlot> {
    constraints.filter(slots)
}
