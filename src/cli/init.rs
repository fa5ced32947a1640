use std::path::Path;

use clap::Parser;
use smart_run::{config::Config, prelude::*};

#[derive(Parser)]
pub struct InitArgs {
    /// Overwrite the existing configuration.
    #[clap(long)]
    force: bool,
}

impl InitArgs {
    pub fn run(self, path: &Path) -> Result {
        ensure!(
            self.force || !path.exists(),
            "`{}` already exists, use `--force` to overwrite it",
            path.display(),
        );
        Config::sample().write_to(path)?;
        println!("Written `{}`, edit it to describe your household and appliances.", path.display());
        Ok(())
    }
}
