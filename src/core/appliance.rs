use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use bon::Builder;
use chrono::{DateTime, Local, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{
    core::{household::Household, search::Options, time_window::TimeWindow},
    prelude::*,
    quantity::{Quantity, energy::KilowattHours, rate::KilowattHourRate},
};

/// Generate the string conversions for a closed set of configuration values.
///
/// An empty string stands for the default variant.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        impl $name {
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim() {
                    "" => Ok(Self::default()),
                    $($value => Ok(Self::$variant),)+
                    other => bail!("unknown {} `{other}`", stringify!($name)),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// How the appliance gets started.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum ControlType {
    /// Somebody has to press the button.
    #[default]
    Manual,

    /// Smart plug or home automation starts it.
    Smart,
}

string_enum!(ControlType { Manual => "manual", Smart => "smart" });

#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum UsageFrequency {
    #[default]
    Daily,
    ThreeTimesWeekly,
    Weekly,

    /// Only when explicitly requested.
    OnDemand,
}

string_enum!(UsageFrequency {
    Daily => "daily",
    ThreeTimesWeekly => "3x_week",
    Weekly => "weekly",
    OnDemand => "on_demand",
});

impl UsageFrequency {
    /// Decide whether a recommendation should be shown on the current date.
    ///
    /// Run history is not tracked yet, so the weekly frequencies always pass.
    #[must_use]
    pub const fn should_show(self, _last_run: Option<NaiveDate>, _today: NaiveDate) -> bool {
        match self {
            Self::Daily | Self::ThreeTimesWeekly | Self::Weekly => true,
            Self::OnDemand => false,
        }
    }
}

/// Operational type of an appliance.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum ApplianceClass {
    /// Runs on its own, like a dishwasher.
    #[default]
    Standalone,

    /// Implies a successor step, like a washing machine followed by a dryer.
    Coupled,

    /// Powered step which the weather may replace for free, like a tumble dryer.
    WeatherDependent,
}

string_enum!(ApplianceClass {
    Standalone => "standalone",
    Coupled => "coupled",
    WeatherDependent => "weather_dependent",
});

/// Number of days the user is ready to postpone the run for.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct WaitDays(u8);

impl WaitDays {
    pub const MAX: u8 = 3;

    #[must_use]
    pub fn new(days: u8) -> Self {
        Self(days.min(Self::MAX))
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl From<i64> for WaitDays {
    fn from(days: i64) -> Self {
        Self(u8::try_from(days.clamp(0, i64::from(Self::MAX))).unwrap_or_default())
    }
}

impl From<WaitDays> for u8 {
    fn from(days: WaitDays) -> Self {
        days.0
    }
}

#[must_use]
#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
pub struct Appliance {
    #[builder(into)]
    pub id: String,

    #[builder(into)]
    pub name: String,

    pub cycle_minutes: u32,

    #[serde(default)]
    #[builder(default)]
    pub tolerance_minutes: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub allowed_windows: Vec<TimeWindow>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[builder(default)]
    pub blocked_windows: Vec<TimeWindow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_by: Option<DateTime<Local>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_by: Option<DateTime<Local>>,

    /// From 1 (silent) to 5 (loud). Quiet hours apply from 3 on.
    #[serde(default = "Appliance::default_level")]
    #[builder(default = Appliance::default_level())]
    pub noise_level: u8,

    #[serde(
        default,
        rename = "price_cap_pence_per_kwh",
        skip_serializing_if = "Option::is_none"
    )]
    pub price_cap: Option<KilowattHourRate>,

    #[serde(default = "Appliance::default_level")]
    #[builder(default = Appliance::default_level())]
    pub priority: u8,

    #[serde(default = "Appliance::default_energy", rename = "estimated_kwh")]
    #[builder(default = Appliance::default_energy())]
    pub estimated_energy: KilowattHours,

    #[serde(default = "Appliance::default_enabled")]
    #[builder(default = true)]
    pub enabled: bool,

    #[serde(default)]
    #[builder(default)]
    pub control_type: ControlType,

    #[serde(default)]
    #[builder(default)]
    pub usage_frequency: UsageFrequency,

    #[serde(default)]
    #[builder(default)]
    pub class: ApplianceClass,

    /// Appliance that runs right after this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub coupled_appliance_id: Option<String>,

    #[serde(default)]
    #[builder(default)]
    pub can_wait_days: WaitDays,
}

impl Appliance {
    const fn default_level() -> u8 {
        3
    }

    const fn default_energy() -> KilowattHours {
        Quantity(1.0)
    }

    const fn default_enabled() -> bool {
        true
    }

    pub fn cycle_duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.cycle_minutes))
    }

    #[must_use]
    pub const fn should_show_recommendation(
        &self,
        last_run: Option<NaiveDate>,
        today: NaiveDate,
    ) -> bool {
        self.usage_frequency.should_show(last_run, today)
    }

    /// Optimization weights for a single run of the appliance.
    pub const fn options(&self, household: &Household) -> Options {
        Options {
            estimated_energy: self.estimated_energy,
            carbon_weight: household.carbon_weight,
            pv_weight: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_enums() -> Result {
        assert_eq!("smart".parse::<ControlType>()?, ControlType::Smart);
        assert_eq!("3x_week".parse::<UsageFrequency>()?, UsageFrequency::ThreeTimesWeekly);
        assert_eq!(
            "weather_dependent".parse::<ApplianceClass>()?,
            ApplianceClass::WeatherDependent,
        );
        assert!("sometimes".parse::<UsageFrequency>().is_err());
        Ok(())
    }

    #[test]
    fn test_empty_string_means_default() -> Result {
        assert_eq!("".parse::<ControlType>()?, ControlType::Manual);
        assert_eq!("".parse::<UsageFrequency>()?, UsageFrequency::Daily);
        assert_eq!("".parse::<ApplianceClass>()?, ApplianceClass::Standalone);
        Ok(())
    }

    #[test]
    fn test_should_show_recommendation() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let last_run = today.pred_opt();
        for last_run in [None, last_run] {
            assert!(UsageFrequency::Daily.should_show(last_run, today));
            assert!(!UsageFrequency::OnDemand.should_show(last_run, today));
            assert!(UsageFrequency::ThreeTimesWeekly.should_show(last_run, today));
            assert!(UsageFrequency::Weekly.should_show(last_run, today));
        }
    }

    #[test]
    fn test_can_wait_days_is_clamped() -> Result {
        let appliance: Appliance = toml::from_str(
            r#"
                id = "washer"
                name = "Washing machine"
                cycle_minutes = 120
                class = "coupled"
                can_wait_days = 7
            "#,
        )?;
        assert_eq!(appliance.can_wait_days.get(), 3);
        assert_eq!(appliance.class, ApplianceClass::Coupled);
        assert_eq!(appliance.control_type, ControlType::Manual);
        assert!(appliance.enabled);
        Ok(())
    }

    #[test]
    fn test_can_wait_days_out_of_range() -> Result {
        for (value, expected) in [(-1, 0), (300, 3)] {
            let appliance: Appliance = toml::from_str(&format!(
                r#"
                    id = "washer"
                    name = "Washing machine"
                    cycle_minutes = 120
                    can_wait_days = {value}
                "#,
            ))?;
            assert_eq!(appliance.can_wait_days.get(), expected);
        }
        assert_eq!(WaitDays::new(2).get(), 2);
        Ok(())
    }

    #[test]
    fn test_builder_defaults() {
        let appliance =
            Appliance::builder().id("dishwasher").name("Dishwasher").cycle_minutes(90).build();
        assert_eq!(appliance.noise_level, 3);
        assert_eq!(appliance.class, ApplianceClass::Standalone);
        assert_eq!(appliance.usage_frequency, UsageFrequency::Daily);
        assert_eq!(appliance.can_wait_days, WaitDays::default());
        assert_eq!(appliance.cycle_duration(), TimeDelta::minutes(90));
    }
}
