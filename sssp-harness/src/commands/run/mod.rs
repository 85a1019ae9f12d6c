use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::Parser;
use log::warn;

use crate::{
    commands::ProfileArgs,
    configs::{
        harness::LoadedProfile,
        run_info::{Resumed, RunInfo},
    },
    sweep::{FailurePolicy, Progress, ResultStore, SweepSummary},
    utils,
};

mod checks;
pub mod runner;

/// Run every scenario of a profile, resuming from the result cache
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
    /// Override the edge probabilities, comma separated
    #[arg(long, value_delimiter = ',')]
    pub probs: Option<Vec<f64>>,
    /// Override the step sizes, comma separated
    #[arg(long, value_delimiter = ',')]
    pub deltas: Option<Vec<u32>>,
    /// Override the work budget (vertices² × probability)
    #[arg(long)]
    pub budget: Option<f64>,
    /// Per-invocation timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// What to do when an implementation fails
    #[arg(long, value_enum)]
    pub on_failure: Option<FailurePolicy>,
    /// Override the result cache path
    #[arg(long)]
    pub results: Option<PathBuf>,
    /// Recompute scenarios whose stored results no longer match the profile
    #[arg(long, default_value = "false")]
    pub discard_stale: bool,
    /// Skip chart output after the run
    #[arg(long, default_value = "false")]
    pub no_charts: bool,
    #[arg(long, default_value = "false")]
    /// (Linux only) Allow benchmarking even when multiple users are logged in
    pub allow_multi_user: bool,
    /// (Linux only) Allow any scaling governor value, instead of only `performance`
    #[arg(long, default_value = "false")]
    pub allow_any_scaling_governor: bool,
}

impl RunArgs {
    fn generate_runid(&self) -> (String, DateTime<Local>) {
        let t = Local::now();
        let time = t.format("%Y-%m-%d-%a-%H%M%S").to_string();
        let host = utils::sys::get_host_name();
        let run_id = format!("{}-{}-{}", self.profile.profile, host, time);
        (run_id, t)
    }

    fn apply_overrides(&self, loaded: &mut LoadedProfile) -> anyhow::Result<()> {
        let profile = &mut loaded.profile;
        if let Some(probs) = &self.probs {
            profile.probabilities = probs.clone();
        }
        if let Some(deltas) = &self.deltas {
            profile.deltas = Some(deltas.clone());
        }
        if let Some(budget) = self.budget {
            profile.budget = Some(budget);
        }
        if let Some(timeout) = self.timeout {
            profile.timeout = Some(timeout);
        }
        if let Some(policy) = self.on_failure {
            profile.on_failure = policy;
        }
        // Given on the command line, so relative to the current directory
        if let Some(results) = &self.results {
            profile.results = std::env::current_dir()?.join(results);
        }
        Ok(())
    }

    fn prepare_logs_dir(&self, logs_dir: &Path, run_id: &str) -> anyhow::Result<PathBuf> {
        let log_dir = logs_dir.join(run_id);
        let latest_log_dir = logs_dir.join("latest");
        std::fs::create_dir_all(&log_dir)?;
        if latest_log_dir.is_symlink() || latest_log_dir.is_file() {
            std::fs::remove_file(&latest_log_dir)?;
        } else if latest_log_dir.is_dir() {
            std::fs::remove_dir_all(&latest_log_dir)?;
        }
        #[cfg(target_os = "windows")]
        std::os::windows::fs::symlink_dir(&log_dir, latest_log_dir)?;
        #[cfg(not(target_os = "windows"))]
        std::os::unix::fs::symlink(&log_dir, latest_log_dir)?;
        Ok(log_dir)
    }

    /// The run recorded under `<logs>/latest`, if any.
    fn previous_run(&self, logs_dir: &Path) -> Option<RunInfo> {
        let path = logs_dir.join("latest").join("config.toml");
        if !path.is_file() {
            return None;
        }
        match RunInfo::load(&path) {
            Ok(run) => Some(run),
            Err(e) => {
                warn!("Ignoring unreadable run summary {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Warn if partial results are about to be extended on a different setup.
    fn resume_checks(&self, loaded: &LoadedProfile, old: &RunInfo, new: &RunInfo) -> anyhow::Result<Option<Resumed>> {
        let profile = &loaded.profile;
        let catalog = ResultStore::new(loaded.results_path()).load()?;
        let plan = profile.execution_plan()?;
        let labels = plan.labels();
        let planner = profile.planner();
        let resuming = profile.scenarios().iter().any(|s| {
            planner
                .plan(s.prob, profile.cap_for(s.prob))
                .map(|sweep| {
                    matches!(
                        catalog.progress(&s.key(), &sweep, &labels),
                        Progress::Partial { .. }
                    )
                })
                .unwrap_or(false)
        });
        if !resuming {
            return Ok(None);
        }
        Ok(Some(Resumed {
            runid: old.runid.clone(),
            changed: checks::resume_check(old, new),
        }))
    }

    pub fn run(&self) -> anyhow::Result<SweepSummary> {
        let mut loaded = self.profile.load()?;
        self.apply_overrides(&mut loaded)?;
        let plan = loaded.profile.execution_plan()?;
        // Prepare logs dir and runid
        let logs_dir = loaded.logs_dir();
        let old_run = self.previous_run(&logs_dir);
        let (run_id, start_time) = self.generate_runid();
        let log_dir = self.prepare_logs_dir(&logs_dir, &run_id)?;
        let mut run_info = RunInfo::new(&loaded.name, loaded.profile.clone(), run_id, start_time);
        run_info.dump(&log_dir)?;
        checks::pre_run_check(self, &loaded, &plan, &run_info)?;
        if let Some(old) = &old_run {
            run_info.resumed = self.resume_checks(&loaded, old, &run_info)?;
            if run_info.resumed.is_some() {
                run_info.dump(&log_dir)?;
            }
        }
        // Run the sweep
        let runner = runner::SweepRunner::new(&loaded, &plan, &run_info, &log_dir);
        let summary = runner.run(self)?;
        run_info.finish(&log_dir)?;
        Ok(summary)
    }
}
