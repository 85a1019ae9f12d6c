use std::path::PathBuf;

use clap::Args;

use crate::configs::harness::{LoadedProfile, SweepConfig, DEFAULT_CONFIG_FILE};

pub mod plan;
pub mod report;
pub mod run;

/// Where the sweep profile comes from.
#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Path to the sweep configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    #[arg(long, default_value = "default")]
    /// Sweep profile
    pub profile: String,
}

impl ProfileArgs {
    pub fn load(&self) -> anyhow::Result<LoadedProfile> {
        SweepConfig::load_profile(&self.config, &self.profile)
    }
}
