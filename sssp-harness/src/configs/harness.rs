//! The sweep configuration file.
//!
//! By default this is `./sweep.toml`. Relative paths inside a profile are
//! resolved against the directory containing the file.
//!
//! # Example:
//!
//! The following example defines a `default` profile for the delta-stepping family.
//!
//! ```toml
//! [profiles.default]
//! probabilities = [0.9]
//! deltas = [1, 60, 100]   # Optional. Omit for algorithms without a step size
//! start-size = 1000       # Optional. Default to 100
//! budget = 3e8            # Optional. Stop once vertices² × probability exceeds it
//! size-cap = 25000        # Optional. Absolute upper bound on the vertex count
//! size-caps = [{ prob = 0.9, cap = 20000 }] # Optional. Per-probability caps
//! timeout = 3600          # Optional. Seconds per invocation
//! on-failure = "abort"    # Optional. Or "skip-scenario"
//!
//! # The first implementation is the baseline. It regenerates the shared graph
//! # for every vertex size, all others reuse it.
//! [[profiles.default.implementations]]
//! label = "C++"
//! executable = "./main-cpp.o"
//!
//! [[profiles.default.implementations]]
//! label = "OpenMP CPU"
//! executable = "./main-openmp-cpu.o"
//! env = { OMP_NUM_THREADS = "16" }
//!
//! [profiles.default.sampling]
//! trim = 2
//! min-samples = 5
//! short-samples = "mean"  # Or "reject"
//! ```
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::sweep::{
    extract::{DEFAULT_PATTERN, ShortSamples},
    planner::{GrowthSchedule, GrowthStep, DEFAULT_START_SIZE},
    scenario, ExecutionPlan, Extractor, FailurePolicy, Implementation, PatternExtractor,
    Scenario, SizeSweepPlanner, TrimmedMean,
};

pub const DEFAULT_CONFIG_FILE: &str = "sweep.toml";

/// The sweep configuration: a set of named profiles.
#[derive(Serialize, Deserialize, Debug)]
pub struct SweepConfig {
    /// Evaluation profiles
    pub profiles: HashMap<String, Profile>,
}

impl SweepConfig {
    pub fn load(path: &Path) -> anyhow::Result<SweepConfig> {
        if !path.is_file() {
            anyhow::bail!("Failed to load {}", path.display());
        }
        let s = std::fs::read_to_string(path)?;
        let config = toml::from_str::<SweepConfig>(&s)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        if config.profiles.is_empty() {
            anyhow::bail!("No profiles found in {}", path.display());
        }
        Ok(config)
    }

    /// Load one profile, with its paths resolved against the config file's directory.
    pub fn load_profile(path: &Path, name: &str) -> anyhow::Result<LoadedProfile> {
        let mut config = Self::load(path)?;
        let Some(profile) = config.profiles.remove(name) else {
            anyhow::bail!("Could not find sweep profile `{}`", name);
        };
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_owned)
            .unwrap_or_else(|| PathBuf::from("."));
        let base_dir = if base_dir.is_absolute() {
            base_dir
        } else {
            std::env::current_dir()?.join(base_dir)
        };
        Ok(LoadedProfile {
            name: name.to_owned(),
            profile,
            base_dir,
        })
    }
}

/// A profile together with where it was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedProfile {
    pub name: String,
    pub profile: Profile,
    pub base_dir: PathBuf,
}

impl LoadedProfile {
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_owned()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.resolve(&self.profile.results)
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.resolve(&self.profile.charts_dir)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.resolve(&self.profile.work_dir)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.resolve(&self.profile.logs_dir)
    }
}

fn default_start_size() -> usize {
    DEFAULT_START_SIZE
}

fn default_results() -> PathBuf {
    PathBuf::from("results.json")
}

fn default_charts_dir() -> PathBuf {
    PathBuf::from("benchmarks")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_logs_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_graph_file() -> PathBuf {
    PathBuf::from("graph.txt")
}

fn default_growth() -> Vec<GrowthStep> {
    GrowthSchedule::default().steps
}

fn default_tail_step() -> usize {
    GrowthSchedule::default().tail
}

/// The benchmarking profile.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Profile {
    /// Implementations to compare. The baseline runs first for every vertex size.
    pub implementations: Vec<Implementation>,
    /// The baseline label. Default to the first implementation.
    #[serde(default)]
    pub baseline: Option<String>,
    /// Edge probabilities, each in (0, 1]
    pub probabilities: Vec<f64>,
    /// Step sizes for the delta-stepping family
    #[serde(default)]
    pub deltas: Option<Vec<u32>>,
    /// First vertex count of every sweep. Default is 100
    #[serde(default = "default_start_size")]
    pub start_size: usize,
    /// Upper bound on vertices² × probability
    #[serde(default)]
    pub budget: Option<f64>,
    /// Absolute upper bound on the vertex count
    #[serde(default)]
    pub size_cap: Option<usize>,
    /// Per-probability caps, overriding `size-cap`
    #[serde(default)]
    pub size_caps: Vec<SizeCap>,
    /// The stepped growth of the vertex count
    #[serde(default = "default_growth")]
    pub growth: Vec<GrowthStep>,
    /// Step above the last `growth` threshold
    #[serde(default = "default_tail_step")]
    pub tail_step: usize,
    /// Result cache. Default is `results.json`
    #[serde(default = "default_results")]
    pub results: PathBuf,
    /// Where chart series are written. Default is `benchmarks`
    #[serde(default = "default_charts_dir")]
    pub charts_dir: PathBuf,
    /// Working directory of every invocation
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Run logs
    #[serde(default = "default_logs_dir")]
    pub logs_dir: PathBuf,
    /// Graph file written by `--save`, relative to `work-dir`
    #[serde(default = "default_graph_file")]
    pub graph_file: PathBuf,
    /// Per-invocation timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub on_failure: FailurePolicy,
    /// Environment variables to set for all implementations
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// External plotting program, see [`crate::charts::ExternalPlotter`]
    #[serde(default)]
    pub plot_command: Option<Vec<String>>,
    #[serde(default)]
    pub sampling: Sampling,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SizeCap {
    pub prob: f64,
    pub cap: usize,
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_owned()
}

fn default_trim() -> usize {
    TrimmedMean::default().trim
}

fn default_min_samples() -> usize {
    TrimmedMean::default().min_samples
}

/// How timing samples are found and reduced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Sampling {
    /// Regex whose first capture group is a seconds value
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Samples dropped from each end before averaging. Default is 2
    #[serde(default = "default_trim")]
    pub trim: usize,
    /// Fewer samples than this are handled by `short-samples`. Default is 5
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    #[serde(default)]
    pub short_samples: ShortSamples,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            trim: default_trim(),
            min_samples: default_min_samples(),
            short_samples: ShortSamples::default(),
        }
    }
}

impl Sampling {
    pub fn reducer(&self) -> TrimmedMean {
        TrimmedMean {
            trim: self.trim,
            min_samples: self.min_samples,
            short: self.short_samples,
        }
    }

    pub fn extractor(&self) -> anyhow::Result<Extractor> {
        let strategy = PatternExtractor::new(&self.pattern)?;
        Ok(Extractor::new(strategy, self.reducer()))
    }
}

impl Profile {
    pub fn scenarios(&self) -> Vec<Scenario> {
        scenario::scenarios(&self.probabilities, self.deltas.as_deref())
    }

    pub fn schedule(&self) -> GrowthSchedule {
        let mut steps = self.growth.clone();
        steps.sort_by_key(|s| s.below);
        GrowthSchedule {
            steps,
            tail: self.tail_step,
        }
    }

    pub fn planner(&self) -> SizeSweepPlanner {
        SizeSweepPlanner::new(self.budget)
            .start_size(self.start_size)
            .schedule(self.schedule())
    }

    /// The size cap for one edge probability.
    pub fn cap_for(&self, prob: f64) -> Option<usize> {
        self.size_caps
            .iter()
            .find(|c| c.prob == prob)
            .map(|c| c.cap)
            .or(self.size_cap)
    }

    pub fn execution_plan(&self) -> anyhow::Result<ExecutionPlan> {
        Ok(ExecutionPlan::new(
            self.implementations.clone(),
            self.baseline.as_deref(),
        )?)
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}
