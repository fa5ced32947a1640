use std::{collections::HashSet, fs, path::Path};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    core::{
        appliance::{Appliance, ApplianceClass, ControlType, UsageFrequency, WaitDays},
        household::Household,
    },
    prelude::*,
    quantity::Quantity,
};

/// Household and appliance configuration, stored as TOML.
#[must_use]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub household: Household,

    #[serde(default, rename = "appliance")]
    pub appliances: Vec<Appliance>,
}

impl Config {
    pub const DEFAULT_PATH: &'static str = "smart-run.toml";

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn read_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`, try `smart-run init`", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("invalid configuration in `{}`", path.display()))?;
        debug!(n_appliances = config.appliances.len(), "loaded");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn write_to(&self, path: &Path) -> Result {
        let text = toml::to_string_pretty(self).context("failed to serialize the configuration")?;
        fs::write(path, text).with_context(|| format!("failed to write `{}`", path.display()))?;
        info!("written");
        Ok(())
    }

    /// Starter configuration: a washer with a dryer, and a dishwasher.
    pub fn sample() -> Self {
        let washer = Appliance::builder()
            .id("washer")
            .name("Washing machine")
            .cycle_minutes(120)
            .noise_level(4)
            .estimated_energy(Quantity(1.0))
            .class(ApplianceClass::Coupled)
            .coupled_appliance_id("dryer")
            .can_wait_days(WaitDays::new(2))
            .build();
        let dryer = Appliance::builder()
            .id("dryer")
            .name("Tumble dryer")
            .cycle_minutes(90)
            .noise_level(4)
            .estimated_energy(Quantity(2.5))
            .class(ApplianceClass::WeatherDependent)
            .usage_frequency(UsageFrequency::OnDemand)
            .build();
        let dishwasher = Appliance::builder()
            .id("dishwasher")
            .name("Dishwasher")
            .cycle_minutes(150)
            .noise_level(2)
            .estimated_energy(Quantity(1.2))
            .control_type(ControlType::Smart)
            .build();
        Self { household: Household::default(), appliances: vec![washer, dryer, dishwasher] }
    }

    pub fn appliance(&self, id: &str) -> Option<&Appliance> {
        self.appliances.iter().find(|appliance| appliance.id == id)
    }

    /// Successor of the appliance, if any.
    pub fn find_coupled(&self, appliance: &Appliance) -> Option<&Appliance> {
        appliance.coupled_appliance_id.as_deref().and_then(|id| self.appliance(id))
    }

    /// Select the enabled appliances, or the specific one.
    pub fn select(&self, id: Option<&str>) -> Result<Vec<&Appliance>> {
        match id {
            Some(id) => {
                let appliance =
                    self.appliance(id).with_context(|| format!("appliance `{id}` not found"))?;
                Ok(vec![appliance])
            }
            None => Ok(self.appliances.iter().filter(|appliance| appliance.enabled).collect()),
        }
    }

    /// Append the appliance, keeping the configuration valid.
    pub fn add(&mut self, appliance: Appliance) -> Result {
        self.appliances.push(appliance);
        if let Err(error) = self.validate() {
            self.appliances.pop();
            return Err(error);
        }
        Ok(())
    }

    /// Unused identifier derived from the appliance name: `Tumble dryer` becomes `tumble-dryer`.
    #[must_use]
    pub fn next_id(&self, name: &str) -> String {
        let slug = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase)
            .join("-");
        let slug = if slug.is_empty() { String::from("appliance") } else { slug };
        let mut id = slug.clone();
        for n in 2.. {
            if self.appliance(&id).is_none() {
                break;
            }
            id = format!("{slug}-{n}");
        }
        id
    }

    fn validate(&self) -> Result {
        let mut ids = HashSet::new();
        for appliance in &self.appliances {
            ensure!(ids.insert(appliance.id.as_str()), "duplicate appliance `{}`", appliance.id);
            ensure!(appliance.cycle_minutes != 0, "`{}` has zero cycle duration", appliance.id);
            ensure!(
                (1..=5).contains(&appliance.noise_level),
                "`{}` noise level must be from 1 to 5",
                appliance.id,
            );
            ensure!(
                (1..=5).contains(&appliance.priority),
                "`{}` priority must be from 1 to 5",
                appliance.id,
            );
        }
        for appliance in &self.appliances {
            if let Some(coupled_id) = &appliance.coupled_appliance_id {
                ensure!(
                    ids.contains(coupled_id.as_str()),
                    "`{}` is coupled with unknown appliance `{coupled_id}`",
                    appliance.id,
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time_window::TimeOfDay;

    #[test]
    fn test_sample_round_trip() -> Result {
        let sample = Config::sample();
        let config = Config::from_toml(&toml::to_string_pretty(&sample)?)?;
        assert_eq!(config.appliances.len(), 3);
        assert_eq!(config.household.region, "C");
        assert_eq!(config.household.quiet_hours, sample.household.quiet_hours);
        let washer = config.appliance("washer").unwrap();
        assert_eq!(config.find_coupled(washer).map(|dryer| dryer.id.as_str()), Some("dryer"));
        Ok(())
    }

    #[test]
    fn test_parse() -> Result {
        let config = Config::from_toml(
            r#"
                [household]
                name = "Flat"
                region = "A"
                available_hours = [{ start = "17:00", end = "22:30" }]

                [[household.quiet_hours]]
                start = "22:00"
                end = "07:00"
                days_of_week = [1, 2, 3, 4, 5, 6, 7]

                [[appliance]]
                id = "washer"
                name = "Washing machine"
                cycle_minutes = 120
                estimated_kwh = 0.9
                price_cap_pence_per_kwh = 25.0
                control_type = ""
                usage_frequency = "3x_week"
                class = "coupled"
                coupled_appliance_id = "dryer"
                can_wait_days = 2

                [[appliance]]
                id = "dryer"
                name = "Tumble dryer"
                cycle_minutes = 90
                class = "weather_dependent"
            "#,
        )?;
        assert_eq!(config.household.name, "Flat");
        assert_eq!(config.household.available_hours[0].end, TimeOfDay::hm(22, 30));
        assert!(config.household.quiet_hours[0].wraps_midnight());
        let washer = &config.appliances[0];
        assert_eq!(washer.control_type, ControlType::Manual);
        assert_eq!(washer.usage_frequency, UsageFrequency::ThreeTimesWeekly);
        assert_eq!(washer.can_wait_days.get(), 2);
        assert_eq!(washer.estimated_energy, Quantity(0.9));
        assert_eq!(config.select(None)?.len(), 2);
        assert_eq!(config.select(Some("dryer"))?[0].name, "Tumble dryer");
        assert!(config.select(Some("kettle")).is_err());
        Ok(())
    }

    #[test]
    fn test_unknown_coupled_appliance() {
        let result = Config::from_toml(
            r#"
                [[appliance]]
                id = "washer"
                name = "Washing machine"
                cycle_minutes = 120
                coupled_appliance_id = "dryer"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_appliance() {
        let result = Config::from_toml(
            r#"
                [[appliance]]
                id = "washer"
                name = "Washing machine"
                cycle_minutes = 120

                [[appliance]]
                id = "washer"
                name = "Another one"
                cycle_minutes = 60
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_add_appliance() -> Result {
        let mut config = Config::sample();
        let id = config.next_id("Tumble dryer");
        assert_eq!(id, "tumble-dryer");
        config.add(
            Appliance::builder()
                .id(id)
                .name("Tumble dryer")
                .cycle_minutes(75)
                .estimated_energy(Quantity(2.0))
                .noise_level(4)
                .priority(2)
                .build(),
        )?;
        assert_eq!(config.next_id("Tumble dryer"), "tumble-dryer-2");

        let config = Config::from_toml(&toml::to_string_pretty(&config)?)?;
        assert_eq!(config.appliances.len(), 4);
        let added = config.appliance("tumble-dryer").unwrap();
        assert_eq!(added.cycle_minutes, 75);
        assert_eq!(added.estimated_energy, Quantity(2.0));
        assert_eq!(added.priority, 2);
        assert!(added.enabled);
        Ok(())
    }

    #[test]
    fn test_add_invalid_appliance() {
        let mut config = Config::sample();
        let duplicate = Appliance::builder().id("washer").name("Washer").cycle_minutes(60).build();
        assert!(config.add(duplicate).is_err());
        let silent =
            Appliance::builder().id("fan").name("Fan").cycle_minutes(60).noise_level(0).build();
        assert!(config.add(silent).is_err());
        assert_eq!(config.appliances.len(), 3);
    }

    #[test]
    fn test_next_id_of_odd_name() {
        let config = Config::default();
        assert_eq!(config.next_id("  Washer (upstairs) "), "washer-upstairs");
        assert_eq!(config.next_id("!!!"), "appliance");
    }

    #[test]
    fn test_empty_file() -> Result {
        let config = Config::from_toml("")?;
        assert!(config.appliances.is_empty());
        assert_eq!(config.household.id, "default");
        Ok(())
    }
}
