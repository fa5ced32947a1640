mod appliance;
mod fetch;
mod init;
mod plan;
mod smart;
mod weather;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use smart_run::{api::octopus, config::Config, prelude::*};

use crate::cli::{
    appliance::ApplianceArgs,
    fetch::FetchArgs,
    init::InitArgs,
    plan::PlanArgs,
    smart::SmartArgs,
    weather::WeatherArgs,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    /// Household and appliance configuration.
    #[clap(
        long,
        short = 'c',
        env = "SMART_RUN_CONFIG",
        default_value = Config::DEFAULT_PATH,
        global = true
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the starter configuration.
    #[clap(name = "init")]
    Init(InitArgs),

    /// Add or list the appliances.
    #[clap(name = "appliance")]
    Appliance(ApplianceArgs),

    /// Fetch and show the half-hourly prices.
    #[clap(name = "fetch")]
    Fetch(FetchArgs),

    /// Find the cheapest runs of each appliance, per day.
    #[clap(name = "plan")]
    Plan(PlanArgs),

    /// Weigh running the appliances today against waiting for cheaper prices or sunshine.
    #[clap(name = "smart")]
    Smart(SmartArgs),

    /// Show the daily forecast and whether it is good for drying the laundry outside.
    #[clap(name = "weather")]
    Weather(WeatherArgs),
}

impl Args {
    pub async fn run(self) -> Result {
        match self.command {
            Command::Init(args) => args.run(&self.config),
            Command::Appliance(args) => args.run(&self.config),
            Command::Fetch(args) => args.run(&self.config).await,
            Command::Plan(args) => args.run(&self.config).await,
            Command::Smart(args) => args.run(&self.config).await,
            Command::Weather(args) => args.run(&self.config).await,
        }
    }
}

#[derive(Parser)]
pub struct OctopusArgs {
    /// Agile product code.
    #[clap(
        long = "octopus-product",
        env = "OCTOPUS_PRODUCT",
        default_value = octopus::Api::DEFAULT_PRODUCT
    )]
    pub product: String,
}

impl OctopusArgs {
    pub fn api(&self, region: &str) -> Result<octopus::Api> {
        Ok(octopus::Api::try_new(region)?.with_product(&self.product))
    }
}
