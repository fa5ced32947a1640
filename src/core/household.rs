use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::core::time_window::{TimeOfDay, TimeWindow};

/// Household-level preferences shared by all the appliances.
#[must_use]
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct Household {
    #[builder(into, default = String::from("default"))]
    #[serde(default = "Household::default_id")]
    pub id: String,

    #[builder(into, default = String::from("My Household"))]
    #[serde(default)]
    pub name: String,

    /// Octopus region code, from `A` to `P`.
    #[builder(into, default = String::from(Household::DEFAULT_REGION))]
    #[serde(default = "Household::default_region")]
    pub region: String,

    #[builder(default = Household::DEFAULT_LATITUDE)]
    #[serde(default = "Household::default_latitude")]
    pub latitude: f64,

    #[builder(default = Household::DEFAULT_LONGITUDE)]
    #[serde(default = "Household::default_longitude")]
    pub longitude: f64,

    #[builder(default)]
    #[serde(default)]
    pub quiet_hours: Vec<TimeWindow>,

    #[builder(default)]
    #[serde(default)]
    pub blocked_windows: Vec<TimeWindow>,

    /// When somebody is at home to start a manually controlled appliance.
    #[builder(default)]
    #[serde(default)]
    pub available_hours: Vec<TimeWindow>,

    #[builder(default)]
    #[serde(default)]
    pub stagger_heavy_loads: bool,

    #[builder(default)]
    #[serde(default)]
    pub carbon_weight: f64,
}

impl Default for Household {
    /// London, with quiet nights every day.
    fn default() -> Self {
        Self::builder()
            .quiet_hours(vec![Self::default_quiet_hours()])
            .stagger_heavy_loads(true)
            .build()
    }
}

impl Household {
    pub const DEFAULT_REGION: &'static str = "C";
    pub const DEFAULT_LATITUDE: f64 = 51.5074;
    pub const DEFAULT_LONGITUDE: f64 = -0.1278;

    fn default_id() -> String {
        String::from("default")
    }

    fn default_region() -> String {
        String::from(Self::DEFAULT_REGION)
    }

    const fn default_latitude() -> f64 {
        Self::DEFAULT_LATITUDE
    }

    const fn default_longitude() -> f64 {
        Self::DEFAULT_LONGITUDE
    }

    fn default_quiet_hours() -> TimeWindow {
        const START: TimeOfDay = TimeOfDay::hm(22, 0);
        const END: TimeOfDay = TimeOfDay::hm(7, 0);
        TimeWindow::new(START, END).on_days(1..=7)
    }
}
