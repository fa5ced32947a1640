use std::path::Path;

use chrono::{Local, NaiveDate};
use clap::Parser;
use smart_run::{
    api::PriceProvider,
    config::Config,
    core::household::Household,
    prelude::*,
};

use crate::{cli::OctopusArgs, tables::build_slots_table};

#[derive(Parser)]
pub struct FetchArgs {
    /// Specific day, otherwise the upcoming slots of today and tomorrow.
    #[clap(long)]
    date: Option<NaiveDate>,

    /// Octopus region code, otherwise the configured one.
    #[clap(long, env = "OCTOPUS_REGION")]
    region: Option<String>,

    #[clap(flatten)]
    octopus: OctopusArgs,
}

impl FetchArgs {
    #[instrument(skip_all)]
    pub async fn run(self, config_path: &Path) -> Result {
        let region = match self.region {
            Some(region) => region,
            None if config_path.exists() => Config::read_from(config_path)?.household.region,
            None => String::from(Household::DEFAULT_REGION),
        };
        let api = self.octopus.api(&region)?;
        let slots = match self.date {
            Some(date) => api.get_slots(date).await?,
            None => api.get_upcoming_slots(Local::now()).await?,
        };
        ensure!(!slots.is_empty(), "no prices are published for region `{region}` yet");
        info!(n_slots = slots.len(), %region, "fetched the prices");
        println!("{}", build_slots_table(&slots));
        Ok(())
    }
}
