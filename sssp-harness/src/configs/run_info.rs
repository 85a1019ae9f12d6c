//! The per-run summary.
//!
//! Every `sssp-harness run` generates a unique `RUNID` and dumps a summary of
//! the run to `<logs-dir>/<RUNID>/config.toml`: the enabled profile, the git
//! commit of the working directory, and the system info at the time of the run.
//! `<logs-dir>/latest` always points to the most recent run.

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::utils;

use super::harness::Profile;

/// The run metadata. Collected before the sweep starts and updated once it finishes.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunInfo {
    /// Benchmark run id
    pub runid: String,
    /// Benchmark start time
    #[serde(rename = "start-time-utc")]
    pub start_timestamp_utc: i64,
    /// Benchmark finish time
    #[serde(rename = "finish-time-utc")]
    pub finish_timestamp_utc: Option<i64>,
    /// The commit of the directory the sweep was started from, `unknown` outside a git repo
    pub commit: String,
    /// Name of the enabled profile
    #[serde(rename = "profile-name")]
    pub profile_name: String,
    /// The enabled profile, after command line overrides
    pub profile: Profile,
    /// Current system information
    pub system: SystemInfo,
    /// Set when this run extended partial results left by an earlier run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumed: Option<Resumed>,
}

/// The earlier run whose partial results were extended, and what changed since.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Resumed {
    pub runid: String,
    /// Names of the environment entries that differ, empty if nothing did
    pub changed: Vec<String>,
}

impl RunInfo {
    pub fn new(profile_name: &str, profile: Profile, runid: String, start_time: DateTime<Local>) -> Self {
        Self {
            runid,
            start_timestamp_utc: start_time.with_timezone(&Utc).timestamp(),
            finish_timestamp_utc: None,
            commit: utils::git::get_git_hash(),
            profile_name: profile_name.to_owned(),
            profile,
            system: utils::sys::get_current_system_info(),
            resumed: None,
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn dump(&self, log_dir: &Path) -> anyhow::Result<()> {
        std::fs::create_dir_all(log_dir)?;
        std::fs::write(log_dir.join("config.toml"), toml::to_string(self)?)?;
        Ok(())
    }

    pub fn finish(&mut self, log_dir: &Path) -> anyhow::Result<()> {
        self.finish_timestamp_utc = Some(Utc::now().timestamp());
        self.dump(log_dir)
    }
}

/// The system information, including the hardware specs, the OS info, and the environment variables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SystemInfo {
    /// Host name
    pub host: String,
    /// Operating system name and version
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// Kernel version
    #[serde(rename = "kernel-version")]
    pub kernel: String,
    /// CPU model
    #[serde(rename = "cpu-model")]
    pub cpu_model: String,
    /// CPU frequency of each core
    #[serde(rename = "cpu-frequency")]
    pub cpu_frequency: Vec<usize>,
    /// Total memory size in bytes
    pub memory_size: usize,
    /// Total swap size in bytes
    pub swap_size: usize,
    /// (*Linux only*) All logged in users
    #[cfg(target_os = "linux")]
    pub users: Vec<String>,
    /// Total number of running processes
    pub processes: usize,
    /// All current environment variables
    pub env: HashMap<String, String>,
    /// The PID of the current process
    pub pid: usize,
    /// (*Linux only*) The scaling governor of each CPU core
    #[cfg(target_os = "linux")]
    #[serde(rename = "scaling-governor")]
    pub scaling_governor: Vec<String>,
}
