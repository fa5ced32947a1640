use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate};

use crate::{core::slot::PriceSlot, prelude::*};

#[async_trait]
pub trait PriceProvider: Sync {
    /// Fetch today's and tomorrow's slots which have not ended yet.
    ///
    /// Tomorrow's prices get published in the afternoon, so their absence is not an error.
    #[instrument(skip_all, fields(since = %since))]
    async fn get_upcoming_slots(&self, since: DateTime<Local>) -> Result<Vec<PriceSlot>> {
        let today = since.date_naive();
        let mut slots = self.get_slots(today).await?;
        if let Some(tomorrow) = today.succ_opt() {
            match self.get_slots(tomorrow).await {
                Ok(tomorrow_slots) => slots.extend(tomorrow_slots),
                Err(error) => warn!(%tomorrow, "prices are not available yet: {error:#}"),
            }
        }
        slots.retain(|slot| slot.end > since);
        Ok(slots)
    }

    /// Fetch the slots of the specified day, sorted by their start.
    async fn get_slots(&self, on: NaiveDate) -> Result<Vec<PriceSlot>>;
}

/// Key the slots by the local calendar date of their start.
pub fn group_by_date(
    slots: impl IntoIterator<Item = PriceSlot>,
) -> BTreeMap<NaiveDate, Vec<PriceSlot>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<PriceSlot>> = BTreeMap::new();
    for slot in slots {
        by_date.entry(slot.date()).or_default().push(slot);
    }
    by_date
}
