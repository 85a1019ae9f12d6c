//! The sweep loop: plan, resume, execute, record, persist.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::{
    error::{ExecError, StoreError, SweepError},
    exec::{Cell, CellRunner, GraphMode, Implementation},
    planner::SizeSweepPlanner,
    scenario::Scenario,
    store::{ResultCatalog, ResultStore},
};

/// What to do with a sweep once one of its cells fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the whole run
    #[default]
    Abort,
    /// Abandon the rest of the failing scenario and continue with the next one
    SkipScenario,
}

/// The baseline produces the shared graph for each cell; dependents only read it.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    baseline: Implementation,
    dependents: Vec<Implementation>,
}

impl ExecutionPlan {
    /// `baseline` names the producing implementation; the first one if `None`.
    pub fn new(
        implementations: Vec<Implementation>,
        baseline: Option<&str>,
    ) -> Result<Self, SweepError> {
        let mut implementations = implementations;
        if implementations.is_empty() {
            return Err(SweepError::InvalidPlan("no implementations".to_owned()));
        }
        for (i, a) in implementations.iter().enumerate() {
            if implementations[i + 1..].iter().any(|b| b.label == a.label) {
                return Err(SweepError::InvalidPlan(format!(
                    "duplicate implementation label `{}`",
                    a.label
                )));
            }
        }
        let index = match baseline {
            Some(label) => implementations
                .iter()
                .position(|i| i.label == label)
                .ok_or_else(|| {
                    SweepError::InvalidPlan(format!("baseline `{}` is not an implementation", label))
                })?,
            None => 0,
        };
        let baseline = implementations.remove(index);
        Ok(Self {
            baseline,
            dependents: implementations,
        })
    }

    pub fn baseline(&self) -> &Implementation {
        &self.baseline
    }

    pub fn dependents(&self) -> &[Implementation] {
        &self.dependents
    }

    /// Execution order: baseline first.
    pub fn implementations(&self) -> impl Iterator<Item = &Implementation> {
        std::iter::once(&self.baseline).chain(&self.dependents)
    }

    pub fn labels(&self) -> Vec<String> {
        self.implementations().map(|i| i.label.clone()).collect()
    }
}

/// The graph file shared by the invocations of one cell.
#[derive(Debug)]
pub struct SharedGraph {
    path: PathBuf,
    written_for: Option<Cell>,
}

impl SharedGraph {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written_for: None,
        }
    }

    fn invalidate(&mut self) {
        self.written_for = None;
    }

    fn written(&mut self, cell: Cell) {
        self.written_for = Some(cell);
    }

    fn reader(&self, cell: &Cell) -> Result<&Path, SweepError> {
        match &self.written_for {
            Some(c) if c == cell => Ok(&self.path),
            _ => Err(SweepError::GraphUnavailable {
                key: cell.scenario.key(),
                vertices: cell.vertices,
            }),
        }
    }
}

/// Progress callbacks, all optional.
pub trait SweepObserver {
    fn scenario_started(&mut self, _scenario: &Scenario, _sweep: &[usize], _resume_from: usize) {}
    fn scenario_reused(&mut self, _scenario: &Scenario, _sweep: &[usize]) {}
    fn cell_started(&mut self, _cell: &Cell) {}
    fn invocation_finished(
        &mut self,
        _cell: &Cell,
        _index: usize,
        _implementation: &Implementation,
        _result: &Result<f64, ExecError>,
    ) {
    }
    fn cell_finished(&mut self, _cell: &Cell, _timings: Option<&[f64]>) {}
    fn scenario_finished(&mut self, _scenario: &Scenario) {}
}

struct NoopObserver;

impl SweepObserver for NoopObserver {}

#[derive(Debug)]
pub struct CellFailure {
    pub key: String,
    pub vertices: usize,
    pub label: String,
    pub error: ExecError,
}

#[derive(Debug, Default)]
pub struct SweepSummary {
    /// Scenarios that were already complete in the catalog
    pub reused: Vec<String>,
    /// Scenarios completed during this run
    pub completed: Vec<String>,
    /// Scenarios abandoned under [`FailurePolicy::SkipScenario`]
    pub failed: Vec<CellFailure>,
    /// Stale scenarios that were discarded and recomputed
    pub discarded: Vec<String>,
    /// Number of cells executed
    pub cells: usize,
}

pub struct SweepDriver<'a, R: CellRunner> {
    runner: &'a R,
    store: &'a ResultStore,
    plan: &'a ExecutionPlan,
    planner: &'a SizeSweepPlanner,
    caps: &'a dyn Fn(f64) -> Option<usize>,
    graph: SharedGraph,
    policy: FailurePolicy,
    discard_stale: bool,
}

impl<'a, R: CellRunner> SweepDriver<'a, R> {
    pub fn new(
        runner: &'a R,
        store: &'a ResultStore,
        plan: &'a ExecutionPlan,
        planner: &'a SizeSweepPlanner,
        graph_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            store,
            plan,
            planner,
            caps: &|_| None,
            graph: SharedGraph::new(graph_file),
            policy: FailurePolicy::default(),
            discard_stale: false,
        }
    }

    /// Absolute size cap per edge probability.
    pub fn caps(mut self, caps: &'a dyn Fn(f64) -> Option<usize>) -> Self {
        self.caps = caps;
        self
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Drop stale stored results and recompute them instead of failing.
    pub fn discard_stale(mut self, discard_stale: bool) -> Self {
        self.discard_stale = discard_stale;
        self
    }

    pub fn sweep_for(&self, scenario: &Scenario) -> Result<Vec<usize>, SweepError> {
        Ok(self.planner.plan(scenario.prob, (self.caps)(scenario.prob))?)
    }

    pub fn run(
        &mut self,
        catalog: &mut ResultCatalog,
        scenarios: &[Scenario],
    ) -> Result<SweepSummary, SweepError> {
        self.run_observed(catalog, scenarios, &mut NoopObserver)
    }

    /// Run every scenario in order. The catalog is persisted after every cell.
    pub fn run_observed(
        &mut self,
        catalog: &mut ResultCatalog,
        scenarios: &[Scenario],
        observer: &mut dyn SweepObserver,
    ) -> Result<SweepSummary, SweepError> {
        let labels = self.plan.labels();
        let mut summary = SweepSummary::default();
        // Sweeps are fixed up front so a planning error surfaces before any run
        let sweeps = scenarios
            .iter()
            .map(|s| self.sweep_for(s))
            .collect::<Result<Vec<_>, _>>()?;
        for (scenario, sweep) in scenarios.iter().zip(&sweeps) {
            let key = scenario.key();
            let start = match catalog.resume_point(&key, sweep, &labels) {
                Ok(start) => start,
                Err(StoreError::Stale { reason, .. }) if self.discard_stale => {
                    warn!("Discarding stale results for {}: {}", key, reason);
                    catalog.discard(&key);
                    self.store.persist(catalog)?;
                    summary.discarded.push(key.clone());
                    0
                }
                Err(e) => return Err(e.into()),
            };
            if sweep.is_empty() {
                warn!("Sweep for {} is empty, nothing to run", key);
                continue;
            }
            if start == sweep.len() {
                info!("Using existing results for {}", key);
                observer.scenario_reused(scenario, sweep);
                summary.reused.push(key);
                continue;
            }
            if start > 0 {
                info!("Resuming {} at {} vertices ({} of {} sizes done)", key, sweep[start], start, sweep.len());
            } else {
                info!("Benchmarking {} over {} sizes", key, sweep.len());
            }
            observer.scenario_started(scenario, sweep, start);
            let mut finished = true;
            for &vertices in &sweep[start..] {
                let cell = Cell {
                    scenario: *scenario,
                    vertices,
                };
                observer.cell_started(&cell);
                summary.cells += 1;
                match self.run_cell(&cell, observer) {
                    Ok(timings) => {
                        observer.cell_finished(&cell, Some(&timings));
                        catalog.record(&key, &labels, vertices, &timings)?;
                        self.store.persist(catalog)?;
                    }
                    Err((label, error)) => {
                        observer.cell_finished(&cell, None);
                        observer.scenario_finished(scenario);
                        match self.policy {
                            FailurePolicy::Abort => {
                                return Err(error_for_cell(&key, vertices, error));
                            }
                            FailurePolicy::SkipScenario => {
                                warn!("Skipping the rest of {} after {} failed at {} vertices: {}", key, label, vertices, error);
                                if let CellError::Exec(error) = error {
                                    summary.failed.push(CellFailure {
                                        key: key.clone(),
                                        vertices,
                                        label,
                                        error,
                                    });
                                    finished = false;
                                    break;
                                } else {
                                    return Err(error_for_cell(&key, vertices, error));
                                }
                            }
                        }
                    }
                }
            }
            if finished {
                observer.scenario_finished(scenario);
                summary.completed.push(key);
            }
        }
        Ok(summary)
    }

    /// Baseline first, regenerating the graph; then every dependent on that graph.
    fn run_cell(
        &mut self,
        cell: &Cell,
        observer: &mut dyn SweepObserver,
    ) -> Result<Vec<f64>, (String, CellError)> {
        let mut timings = Vec::with_capacity(self.plan.dependents().len() + 1);
        let baseline = self.plan.baseline();
        self.graph.invalidate();
        debug!("{} ({} vertices): {} regenerates the graph", cell.scenario, cell.vertices, baseline.label);
        let result = self.runner.run(baseline, cell, GraphMode::Regenerate);
        observer.invocation_finished(cell, 0, baseline, &result);
        timings.push(result.map_err(|e| (baseline.label.clone(), CellError::Exec(e)))?);
        self.graph.written(*cell);
        for (i, dependent) in self.plan.dependents().iter().enumerate() {
            let path = self
                .graph
                .reader(cell)
                .map_err(|e| (dependent.label.clone(), CellError::Sweep(e)))?;
            let result = self.runner.run(dependent, cell, GraphMode::Reuse(path));
            observer.invocation_finished(cell, i + 1, dependent, &result);
            timings.push(result.map_err(|e| (dependent.label.clone(), CellError::Exec(e)))?);
        }
        Ok(timings)
    }
}

#[derive(Debug)]
enum CellError {
    Exec(ExecError),
    Sweep(SweepError),
}

impl std::fmt::Display for CellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellError::Exec(e) => e.fmt(f),
            CellError::Sweep(e) => e.fmt(f),
        }
    }
}

fn error_for_cell(key: &str, vertices: usize, error: CellError) -> SweepError {
    match error {
        CellError::Exec(source) => SweepError::Cell {
            key: key.to_owned(),
            vertices,
            source,
        },
        CellError::Sweep(e) => e,
    }
}
