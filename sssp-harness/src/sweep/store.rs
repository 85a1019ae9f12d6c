//! The resumable result cache.
//!
//! The persisted document maps scenario keys to the timings gathered so far:
//!
//! ```json
//! { "prob_0.9_delta_1": { "avgs": [[0.12, 0.27], [0.05, 0.09]], "vertices": [1000, 2000], "labels": ["C++", "OpenMP"] } }
//! ```
//!
//! `avgs[i]` belongs to `labels[i]` and is index-aligned with `vertices`. Files
//! written without `labels` are read in configured implementation order.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::warn;
use serde::{Deserialize, Serialize};

use super::error::StoreError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Averaged timings in seconds, one series per implementation
    pub avgs: Vec<Vec<f64>>,
    /// Vertex counts measured so far, a prefix of the planned sweep
    pub vertices: Vec<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

impl ScenarioResult {
    /// Timings of `label`, if this result covers it.
    pub fn timings(&self, label: &str) -> Option<&[f64]> {
        let index = self.labels.iter().position(|l| l == label)?;
        self.avgs.get(index).map(|v| v.as_slice())
    }

    fn check_shape(&self, labels: &[String]) -> Result<(), String> {
        if !self.labels.is_empty() && self.labels != labels {
            return Err(format!(
                "recorded implementations [{}] differ from configured [{}]",
                self.labels.join(", "),
                labels.join(", ")
            ));
        }
        if self.avgs.len() != labels.len() {
            return Err(format!(
                "{} timing series recorded for {} implementations",
                self.avgs.len(),
                labels.len()
            ));
        }
        if let Some((i, series)) = self
            .avgs
            .iter()
            .enumerate()
            .find(|(_, s)| s.len() != self.vertices.len())
        {
            return Err(format!(
                "series {} has {} timings for {} vertex sizes",
                i,
                series.len(),
                self.vertices.len()
            ));
        }
        Ok(())
    }
}

/// How far a scenario has progressed against its planned sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    Absent,
    Partial { done: usize, total: usize },
    Complete,
    Stale(String),
}

/// Every persisted scenario result, by scenario key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCatalog {
    scenarios: BTreeMap<String, ScenarioResult>,
}

impl ResultCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ScenarioResult> {
        self.scenarios.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScenarioResult)> {
        self.scenarios.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn insert(&mut self, key: impl Into<String>, result: ScenarioResult) {
        self.scenarios.insert(key.into(), result);
    }

    pub fn discard(&mut self, key: &str) -> Option<ScenarioResult> {
        self.scenarios.remove(key)
    }

    /// True iff the stored sizes for `key` are exactly `sweep`.
    pub fn is_complete(&self, key: &str, sweep: &[usize]) -> bool {
        self.scenarios
            .get(key)
            .is_some_and(|r| r.vertices == sweep)
    }

    pub fn progress(&self, key: &str, sweep: &[usize], labels: &[String]) -> Progress {
        match self.resume_point(key, sweep, labels) {
            Err(StoreError::Stale { reason, .. }) => Progress::Stale(reason),
            Err(e) => Progress::Stale(e.to_string()),
            Ok(_) if !self.scenarios.contains_key(key) => Progress::Absent,
            Ok(done) if done == sweep.len() => Progress::Complete,
            Ok(done) => Progress::Partial {
                done,
                total: sweep.len(),
            },
        }
    }

    /// Index of the first size of `sweep` without recorded timings.
    ///
    /// Stored data that is not a prefix of `sweep`, or that was recorded for a
    /// different set of implementations, is reported as stale.
    pub fn resume_point(
        &self,
        key: &str,
        sweep: &[usize],
        labels: &[String],
    ) -> Result<usize, StoreError> {
        let Some(result) = self.scenarios.get(key) else {
            return Ok(0);
        };
        let stale = |reason: String| StoreError::Stale {
            key: key.to_owned(),
            reason,
        };
        result.check_shape(labels).map_err(stale)?;
        if !sweep.starts_with(&result.vertices) {
            return Err(stale(format!(
                "recorded sizes {:?} are not a prefix of the planned sweep {:?}",
                result.vertices, sweep
            )));
        }
        Ok(result.vertices.len())
    }

    /// Append the timings of every implementation for one more vertex size.
    pub fn record(
        &mut self,
        key: &str,
        labels: &[String],
        vertices: usize,
        timings: &[f64],
    ) -> Result<(), StoreError> {
        if timings.len() != labels.len() {
            return Err(StoreError::TimingCount {
                key: key.to_owned(),
                expected: labels.len(),
                got: timings.len(),
            });
        }
        let result = self
            .scenarios
            .entry(key.to_owned())
            .or_insert_with(|| ScenarioResult {
                avgs: vec![Vec::new(); labels.len()],
                vertices: Vec::new(),
                labels: labels.to_vec(),
            });
        result.check_shape(labels).map_err(|reason| StoreError::Stale {
            key: key.to_owned(),
            reason,
        })?;
        if result.labels.is_empty() {
            result.labels = labels.to_vec();
        }
        for (series, &t) in result.avgs.iter_mut().zip(timings) {
            series.push(t);
        }
        result.vertices.push(vertices);
        Ok(())
    }
}

/// Owns the on-disk copy of the [`ResultCatalog`]. `load` and `persist` are its
/// only I/O.
#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// An empty catalog if nothing has been persisted yet.
    pub fn load(&self) -> Result<ResultCatalog, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ResultCatalog::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(ResultCatalog::new());
        }
        serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the whole catalog, replacing the previous file atomically.
    /// A failed write is retried once.
    pub fn persist(&self, catalog: &ResultCatalog) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(catalog).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: e.into(),
        })?;
        if let Err(e) = self.write_atomic(&bytes) {
            warn!("Failed to persist {}: {}. Retrying.", self.path.display(), e);
            self.write_atomic(&bytes)
                .map_err(|source| StoreError::Persist {
                    path: self.path.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    fn write_atomic(&self, bytes: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("results.json");
        let tmp = self
            .path
            .with_file_name(format!(".{}.tmp.{}", name, std::process::id()));
        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| std::fs::rename(&tmp, &self.path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        // Make the rename itself durable
        #[cfg(unix)]
        File::open(parent)?.sync_all()?;
        Ok(())
    }
}
