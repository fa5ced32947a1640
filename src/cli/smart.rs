use std::{collections::BTreeMap, path::Path};

use chrono::{Days, Local};
use clap::Parser;
use smart_run::{
    api::{PriceProvider, group_by_date, open_meteo},
    config::Config,
    core::{
        appliance::{ApplianceClass, WaitDays},
        constraints::Constraints,
        smart::SmartPlanner,
        weather::by_date,
    },
    prelude::*,
};

use crate::{cli::OctopusArgs, tables::build_options_table};

#[derive(Parser)]
pub struct SmartArgs {
    /// Plan the specific appliance regardless of its usage frequency.
    #[clap(long)]
    appliance: Option<String>,

    /// Print JSON instead of the tables.
    #[clap(long)]
    json: bool,

    #[clap(flatten)]
    octopus: OctopusArgs,
}

impl SmartArgs {
    #[instrument(skip_all)]
    pub async fn run(self, config_path: &Path) -> Result {
        let config = Config::read_from(config_path)?;
        let household = &config.household;
        let now = Local::now();
        let today = now.date_naive();

        let octopus = self.octopus.api(&household.region)?;
        let mut slots = Vec::new();
        for offset in 0..WaitDays::MAX {
            let date = today
                .checked_add_days(Days::new(u64::from(offset)))
                .context("date is out of range")?;
            match octopus.get_slots(date).await {
                Ok(day_slots) => slots.extend(day_slots),
                Err(error) => warn!(%date, "prices are not available: {error:#}"),
            }
        }
        slots.retain(|slot| slot.start > now);
        let prices_by_date = group_by_date(slots);

        let weather_api = open_meteo::Api::try_new(household.latitude, household.longitude)?;
        let weather_by_date = match weather_api.get_daily_forecast(WaitDays::MAX).await {
            Ok(forecasts) => by_date(forecasts),
            Err(error) => {
                warn!("planning without the weather: {error:#}");
                BTreeMap::new()
            }
        };

        let mut recommendations = Vec::new();
        for appliance in config.select(self.appliance.as_deref())? {
            if appliance.class == ApplianceClass::WeatherDependent {
                debug!(appliance = %appliance.id, "only planned after its predecessor");
                continue;
            }
            if self.appliance.is_none() && !appliance.should_show_recommendation(None, today) {
                let frequency = appliance.usage_frequency;
                debug!(appliance = %appliance.id, %frequency, "skipped");
                continue;
            }
            let result = SmartPlanner::builder()
                .appliance(appliance)
                .maybe_coupled_appliance(config.find_coupled(appliance))
                .prices_by_date(&prices_by_date)
                .weather_by_date(&weather_by_date)
                .household(household)
                .constraints(&Constraints::for_appliance(appliance, household))
                .options(&appliance.options(household))
                .today(today)
                .plan();
            match result {
                Ok(mut recommendation) => {
                    if recommendation.retain_upcoming(now) {
                        recommendations.push(recommendation);
                    } else {
                        info!(appliance = %appliance.id, "all the options are in the past");
                    }
                }
                Err(error) => warn!(appliance = %appliance.id, "{error}"),
            }
        }
        info!(n_recommendations = recommendations.len(), "planned");

        if self.json {
            println!("{}", serde_json::to_string_pretty(&recommendations)?);
        } else {
            for recommendation in &recommendations {
                println!("{}", recommendation.appliance_name);
                println!("{}", build_options_table(recommendation));
                if let Some(best_option) = recommendation.best_option() {
                    println!("{}", best_option.recommendation);
                }
            }
        }
        Ok(())
    }
}
