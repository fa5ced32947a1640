use std::path::Path;

use clap::{Parser, Subcommand};
use smart_run::{config::Config, core::appliance::Appliance, prelude::*, quantity::Quantity};

use crate::tables::build_appliances_table;

#[derive(Parser)]
pub struct ApplianceArgs {
    #[command(subcommand)]
    command: ApplianceCommand,
}

impl ApplianceArgs {
    pub fn run(self, config_path: &Path) -> Result {
        match self.command {
            ApplianceCommand::Add(args) => args.run(config_path),
            ApplianceCommand::List => {
                let config = Config::read_from(config_path)?;
                if config.appliances.is_empty() {
                    println!("No appliances configured.");
                } else {
                    println!("{}", build_appliances_table(&config.appliances));
                }
                Ok(())
            }
        }
    }
}

#[derive(Subcommand)]
pub enum ApplianceCommand {
    /// Add a new appliance to the configuration.
    Add(ApplianceAddArgs),

    /// List the configured appliances.
    List,
}

#[derive(Parser)]
pub struct ApplianceAddArgs {
    #[clap(long, short = 'n')]
    name: String,

    /// Identifier, derived from the name by default.
    #[clap(long)]
    id: Option<String>,

    /// Cycle duration in minutes.
    #[clap(long = "cycle", default_value = "60")]
    cycle_minutes: u32,

    /// Estimated consumption per cycle.
    #[clap(long = "kwh", short = 'k', default_value = "1.0")]
    estimated_kwh: f64,

    /// From 1 (silent) to 5 (loud).
    #[clap(long, default_value = "3")]
    noise: u8,

    /// From 1 to 5.
    #[clap(long, default_value = "3")]
    priority: u8,
}

impl ApplianceAddArgs {
    #[instrument(skip_all, fields(name = %self.name))]
    fn run(self, config_path: &Path) -> Result {
        let mut config =
            if config_path.exists() { Config::read_from(config_path)? } else { Config::default() };
        let id = self.id.unwrap_or_else(|| config.next_id(&self.name));
        let appliance = Appliance::builder()
            .id(id)
            .name(self.name)
            .cycle_minutes(self.cycle_minutes)
            .estimated_energy(Quantity(self.estimated_kwh))
            .noise_level(self.noise)
            .priority(self.priority)
            .build();
        let message = format!("Added `{}` as `{}`.", appliance.name, appliance.id);
        config.add(appliance)?;
        config.write_to(config_path)?;
        println!("{message}");
        Ok(())
    }
}
