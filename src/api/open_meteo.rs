//! [Open-Meteo](https://open-meteo.com/en/docs) daily forecast.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::{api::client, core::weather::WeatherForecast, prelude::*};

pub struct Api {
    client: Client,
    latitude: f64,
    longitude: f64,
}

impl Api {
    const URL: &'static str = "https://api.open-meteo.com/v1/forecast";
    const DAILY: &'static str =
        "temperature_2m_max,temperature_2m_min,precipitation_probability_max,sunshine_duration";
    const TIMEZONE: &'static str = "Europe/London";

    /// Open-Meteo does not forecast further.
    pub const MAX_DAYS: u8 = 16;

    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        Ok(Self { client: client::try_new()?, latitude, longitude })
    }

    #[instrument(
        skip_all,
        fields(latitude = self.latitude, longitude = self.longitude, days = days),
    )]
    pub async fn get_daily_forecast(&self, days: u8) -> Result<Vec<WeatherForecast>> {
        let days = days.clamp(1, Self::MAX_DAYS);
        info!("fetching…");
        let forecasts = self
            .client
            .get(Self::URL)
            .query(&[
                ("latitude", format!("{:.4}", self.latitude)),
                ("longitude", format!("{:.4}", self.longitude)),
                ("daily", String::from(Self::DAILY)),
                ("timezone", String::from(Self::TIMEZONE)),
                ("forecast_days", days.to_string()),
            ])
            .send()
            .await
            .context("failed to call Open-Meteo")?
            .error_for_status()
            .context("the Open-Meteo request failed")?
            .json::<Response>()
            .await
            .context("failed to deserialize the Open-Meteo response")?
            .daily
            .into_forecasts();
        info!(n_days = forecasts.len(), "fetched");
        Ok(forecasts)
    }
}

#[derive(Deserialize)]
struct Response {
    daily: Daily,
}

/// Columns of the daily forecast, missing values come as `null`.
#[derive(Deserialize)]
struct Daily {
    time: Vec<NaiveDate>,

    #[serde(default, rename = "temperature_2m_max")]
    max_temperature: Vec<Option<f64>>,

    #[serde(default, rename = "temperature_2m_min")]
    min_temperature: Vec<Option<f64>>,

    /// Percent.
    #[serde(default, rename = "precipitation_probability_max")]
    precipitation_probability: Vec<Option<f64>>,

    /// Seconds.
    #[serde(default)]
    sunshine_duration: Vec<Option<f64>>,
}

impl Daily {
    fn into_forecasts(self) -> Vec<WeatherForecast> {
        let value_at = |column: &[Option<f64>], index: usize| {
            column.get(index).copied().flatten().unwrap_or_default()
        };
        self.time
            .iter()
            .enumerate()
            .map(|(index, date)| {
                WeatherForecast::new(
                    *date,
                    value_at(&self.sunshine_duration, index) / 3600.0,
                    value_at(&self.max_temperature, index),
                    value_at(&self.min_temperature, index),
                    value_at(&self.precipitation_probability, index),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const RESPONSE: &str = r#"{
        "latitude": 51.5,
        "longitude": -0.12,
        "timezone": "Europe/London",
        "daily_units": {
            "time": "iso8601",
            "temperature_2m_max": "°C",
            "temperature_2m_min": "°C",
            "precipitation_probability_max": "%",
            "sunshine_duration": "s"
        },
        "daily": {
            "time": ["2025-06-14", "2025-06-15", "2025-06-16"],
            "temperature_2m_max": [21.4, 14.2, 19.0],
            "temperature_2m_min": [11.0, 9.1, 10.5],
            "precipitation_probability_max": [5, 80, null],
            "sunshine_duration": [36000.0, 7200.0, 25200.0]
        }
    }"#;

    #[test]
    fn test_parse_response() -> Result {
        let forecasts = serde_json::from_str::<Response>(RESPONSE)?.daily.into_forecasts();
        assert_eq!(forecasts.len(), 3);

        assert_eq!(forecasts[0].date, NaiveDate::from_ymd_opt(2025, 6, 14).unwrap());
        assert_abs_diff_eq!(forecasts[0].sunshine_hours, 10.0);
        assert!(forecasts[0].is_sunny);

        assert_abs_diff_eq!(forecasts[1].precip_prob_percent, 80.0);
        assert!(!forecasts[1].is_sunny);

        // Missing rain probability counts as zero:
        assert_abs_diff_eq!(forecasts[2].precip_prob_percent, 0.0);
        assert!(forecasts[2].is_sunny);
        Ok(())
    }

    #[test]
    fn test_missing_columns() -> Result {
        let forecasts = serde_json::from_str::<Response>(
            r#"{"daily": {"time": ["2025-06-14"], "temperature_2m_max": [20.0]}}"#,
        )?
        .daily
        .into_forecasts();
        assert_abs_diff_eq!(forecasts[0].sunshine_hours, 0.0);
        assert!(!forecasts[0].is_sunny);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_daily_forecast_ok() -> Result {
        let forecasts = Api::try_new(51.5074, -0.1278)?.get_daily_forecast(3).await?;
        assert_eq!(forecasts.len(), 3);
        assert!(forecasts.iter().is_sorted_by_key(|forecast| forecast.date));
        Ok(())
    }
}
