use std::path::Path;

use chrono::{Local, NaiveDate};
use clap::Parser;
use serde::Serialize;
use smart_run::{
    api::{PriceProvider, group_by_date},
    config::Config,
    core::{
        constraints::Constraints,
        search::{Recommendation, WindowSearch},
    },
    prelude::*,
};

use crate::{cli::OctopusArgs, tables::build_recommendations_table};

#[derive(Parser)]
pub struct PlanArgs {
    /// Plan the specific appliance regardless of its usage frequency.
    #[clap(long)]
    appliance: Option<String>,

    /// Number of alternatives per day.
    #[clap(long = "top-n", default_value = "3")]
    top_n: usize,

    /// Print JSON instead of the tables.
    #[clap(long)]
    json: bool,

    #[clap(flatten)]
    octopus: OctopusArgs,
}

/// Best runs of an appliance on a single day.
#[derive(Serialize)]
struct DayPlan {
    appliance_id: String,
    appliance_name: String,
    date: NaiveDate,
    recommendations: Vec<Recommendation>,
}

impl PlanArgs {
    #[instrument(skip_all)]
    pub async fn run(self, config_path: &Path) -> Result {
        let config = Config::read_from(config_path)?;
        let household = &config.household;
        let now = Local::now();
        let today = now.date_naive();

        let mut slots = self.octopus.api(&household.region)?.get_upcoming_slots(now).await?;
        slots.retain(|slot| slot.start > now);
        ensure!(!slots.is_empty(), "no upcoming prices for region `{}`", household.region);
        let prices_by_date = group_by_date(slots);

        let mut plans = Vec::new();
        for appliance in config.select(self.appliance.as_deref())? {
            if self.appliance.is_none() && !appliance.should_show_recommendation(None, today) {
                let frequency = appliance.usage_frequency;
                debug!(appliance = %appliance.id, %frequency, "skipped");
                continue;
            }
            let constraints = Constraints::for_appliance(appliance, household)
                .with_practical(appliance, household);
            let options = appliance.options(household);
            for (date, slots) in &prices_by_date {
                let result = WindowSearch::builder()
                    .slots(slots)
                    .run_minutes(appliance.cycle_minutes)
                    .constraints(&constraints)
                    .options(&options)
                    .top_n(self.top_n)
                    .search();
                match result {
                    Ok(recommendations) => plans.push(DayPlan {
                        appliance_id: appliance.id.clone(),
                        appliance_name: appliance.name.clone(),
                        date: *date,
                        recommendations,
                    }),
                    Err(error) => warn!(appliance = %appliance.id, %date, "{error}"),
                }
            }
        }
        info!(n_plans = plans.len(), "planned");

        if self.json {
            println!("{}", serde_json::to_string_pretty(&plans)?);
        } else {
            for plan in &plans {
                println!("{} on {}", plan.appliance_name, plan.date.format("%A, %-d %B"));
                println!("{}", build_recommendations_table(&plan.recommendations));
            }
        }
        Ok(())
    }
}
