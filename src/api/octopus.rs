//! [Octopus Agile](https://developer.octopus.energy/rest/guides/endpoints) unit rates.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::{
    api::{client, price_provider::PriceProvider},
    core::slot::PriceSlot,
    prelude::*,
    quantity::rate::KilowattHourRate,
};

pub struct Api {
    client: Client,
    product: String,
    region: String,
}

impl Api {
    pub const BASE_URL: &'static str = "https://api.octopus.energy/v1";
    pub const DEFAULT_PRODUCT: &'static str = "AGILE-24-10-01";

    pub fn try_new(region: &str) -> Result<Self> {
        Ok(Self {
            client: client::try_new()?,
            product: String::from(Self::DEFAULT_PRODUCT),
            region: region.trim().to_uppercase(),
        })
    }

    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    fn tariff_code(&self) -> String {
        format!("E-1R-{}-{}", self.product, self.region)
    }

    fn url(&self) -> String {
        format!(
            "{}/products/{}/electricity-tariffs/{}/standard-unit-rates/",
            Self::BASE_URL,
            self.product,
            self.tariff_code(),
        )
    }
}

#[async_trait]
impl PriceProvider for Api {
    /// Get the half-hourly rates within the UTC day.
    #[instrument(skip_all, fields(on = %on, region = %self.region))]
    async fn get_slots(&self, on: NaiveDate) -> Result<Vec<PriceSlot>> {
        let period_from = on.and_time(NaiveTime::MIN).and_utc();
        let period_to = period_from + TimeDelta::days(1);
        info!("fetching…");
        let response = self
            .client
            .get(self.url())
            .query(&[
                ("period_from", period_from.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("period_to", period_to.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ])
            .send()
            .await
            .context("failed to call the Octopus API")?
            .error_for_status()
            .context("the Octopus API request failed")?
            .json::<Response>()
            .await
            .context("failed to deserialize the Octopus response")?;
        let slots = response.into_slots();
        info!(n_slots = slots.len(), "fetched");
        Ok(slots)
    }
}

#[derive(Deserialize)]
struct Response {
    results: Vec<UnitRate>,
}

impl Response {
    /// The API returns the newest rates first.
    fn into_slots(self) -> Vec<PriceSlot> {
        let mut slots: Vec<PriceSlot> = self.results.into_iter().map(PriceSlot::from).collect();
        slots.sort_by_key(|slot| slot.start);
        slots
    }
}

#[derive(Deserialize)]
struct UnitRate {
    value_inc_vat: f64,
    valid_from: DateTime<Utc>,

    /// Open-ended rates have none.
    valid_to: Option<DateTime<Utc>>,
}

impl From<UnitRate> for PriceSlot {
    fn from(unit_rate: UnitRate) -> Self {
        let start = unit_rate.valid_from.with_timezone(&Local);
        let end = unit_rate
            .valid_to
            .map_or_else(|| start + Self::DURATION, |end| end.with_timezone(&Local));
        let rate = KilowattHourRate::from(unit_rate.value_inc_vat);
        Self { start, end, rate, includes_vat: true }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::slot::is_contiguous;

    const RESPONSE: &str = r#"{
        "count": 3,
        "next": null,
        "previous": null,
        "results": [
            {
                "value_exc_vat": 19.05,
                "value_inc_vat": 20.0025,
                "valid_from": "2024-12-01T01:00:00Z",
                "valid_to": "2024-12-01T01:30:00Z",
                "payment_method": null
            },
            {
                "value_exc_vat": 17.1,
                "value_inc_vat": 17.955,
                "valid_from": "2024-12-01T00:30:00Z",
                "valid_to": "2024-12-01T01:00:00Z",
                "payment_method": null
            },
            {
                "value_exc_vat": 16.2,
                "value_inc_vat": 17.01,
                "valid_from": "2024-12-01T00:00:00Z",
                "valid_to": "2024-12-01T00:30:00Z",
                "payment_method": null
            }
        ]
    }"#;

    #[test]
    fn test_url() -> Result {
        let api = Api::try_new(" c ")?;
        assert_eq!(
            api.url(),
            "https://api.octopus.energy/v1/products/AGILE-24-10-01/electricity-tariffs/E-1R-AGILE-24-10-01-C/standard-unit-rates/",
        );
        Ok(())
    }

    #[test]
    fn test_parse_response() -> Result {
        let slots = serde_json::from_str::<Response>(RESPONSE)?.into_slots();
        assert_eq!(slots.len(), 3);
        assert!(is_contiguous(&slots));
        assert_eq!(slots[0].start, "2024-12-01T00:00:00Z".parse::<DateTime<Utc>>()?);
        assert_abs_diff_eq!(slots[0].rate.0, 17.01);
        assert!(slots.iter().all(|slot| slot.includes_vat));
        Ok(())
    }

    #[test]
    fn test_open_ended_rate() -> Result {
        let slots = serde_json::from_str::<Response>(
            r#"{"results": [{"value_inc_vat": 24.5, "valid_from": "2024-12-01T00:00:00Z", "valid_to": null}]}"#,
        )?
        .into_slots();
        assert_eq!(slots[0].end - slots[0].start, PriceSlot::DURATION);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "makes the API request"]
    async fn test_get_upcoming_slots_ok() -> Result {
        let now = Local::now();
        let slots = Api::try_new("C")?.get_upcoming_slots(now).await?;
        assert!(!slots.is_empty());
        assert!(slots.len() <= 2 * 48);
        assert!(slots.iter().is_sorted_by_key(|slot| slot.start));
        Ok(())
    }
}
