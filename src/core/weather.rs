use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily weather summary.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub date: NaiveDate,
    pub sunshine_hours: f64,
    pub max_temp_c: f64,
    pub min_temp_c: f64,

    /// Maximal precipitation probability, percent.
    pub precip_prob_percent: f64,

    /// Good conditions for drying the laundry outside.
    pub is_sunny: bool,
}

impl WeatherForecast {
    pub const MIN_SUNSHINE_HOURS: f64 = 3.0;
    pub const MAX_PRECIP_PROB_PERCENT: f64 = 30.0;
    pub const MIN_MAX_TEMP_C: f64 = 12.0;

    pub fn new(
        date: NaiveDate,
        sunshine_hours: f64,
        max_temp_c: f64,
        min_temp_c: f64,
        precip_prob_percent: f64,
    ) -> Self {
        let is_sunny = sunshine_hours > Self::MIN_SUNSHINE_HOURS
            && precip_prob_percent < Self::MAX_PRECIP_PROB_PERCENT
            && max_temp_c > Self::MIN_MAX_TEMP_C;
        Self { date, sunshine_hours, max_temp_c, min_temp_c, precip_prob_percent, is_sunny }
    }
}

/// Index the daily forecasts by their date.
pub fn by_date(
    forecasts: impl IntoIterator<Item = WeatherForecast>,
) -> BTreeMap<NaiveDate, WeatherForecast> {
    forecasts.into_iter().map(|forecast| (forecast.date, forecast)).collect()
}
