use std::path::Path;

use clap::Parser;
use smart_run::{api::open_meteo, config::Config, core::household::Household, prelude::*};

use crate::tables::build_weather_table;

#[derive(Parser)]
pub struct WeatherArgs {
    /// Number of days to forecast.
    #[clap(long, default_value = "3")]
    days: u8,
}

impl WeatherArgs {
    #[instrument(skip_all, fields(days = self.days))]
    pub async fn run(self, config_path: &Path) -> Result {
        let household = if config_path.exists() {
            Config::read_from(config_path)?.household
        } else {
            Household::default()
        };
        let forecasts = open_meteo::Api::try_new(household.latitude, household.longitude)?
            .get_daily_forecast(self.days)
            .await?;
        println!("{}", build_weather_table(&forecasts));
        Ok(())
    }
}
