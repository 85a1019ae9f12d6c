//! Vertex-count sweeps under a cost budget.
//!
//! Sizes advance by a stepped schedule: small sizes are sampled densely, where
//! timings are noisiest, and large sizes sparsely, where each run is expensive.
//! A size `s` is only kept while `s² × p` stays within the budget and `s` stays
//! within the size cap.

use serde::{Deserialize, Serialize};

use super::error::PlanError;

pub const DEFAULT_START_SIZE: usize = 100;

/// Sizes strictly below `below` advance by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthStep {
    pub below: usize,
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthSchedule {
    /// Ordered by `below`
    pub steps: Vec<GrowthStep>,
    /// Step for sizes above the last threshold
    pub tail: usize,
}

impl Default for GrowthSchedule {
    fn default() -> Self {
        let steps = [(500, 100), (1000, 500), (10_000, 1000), (20_000, 2500)]
            .into_iter()
            .map(|(below, step)| GrowthStep { below, step })
            .collect();
        Self { steps, tail: 5000 }
    }
}

impl GrowthSchedule {
    pub fn step_at(&self, size: usize) -> usize {
        self.steps
            .iter()
            .find(|s| size < s.below)
            .map(|s| s.step)
            .unwrap_or(self.tail)
    }

    fn validate(&self) -> Result<(), PlanError> {
        if let Some(s) = self.steps.iter().find(|s| s.step == 0) {
            return Err(PlanError::ZeroStep { below: s.below });
        }
        if self.tail == 0 {
            return Err(PlanError::ZeroStep { below: usize::MAX });
        }
        Ok(())
    }
}

/// Estimated cost of one run: `size² × prob`, roughly the expected edge count.
pub fn cost(size: usize, prob: f64) -> f64 {
    (size as f64).powi(2) * prob
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeSweepPlanner {
    budget: Option<f64>,
    start_size: usize,
    schedule: GrowthSchedule,
}

impl SizeSweepPlanner {
    pub fn new(budget: Option<f64>) -> Self {
        Self {
            budget,
            start_size: DEFAULT_START_SIZE,
            schedule: GrowthSchedule::default(),
        }
    }

    pub fn start_size(mut self, start_size: usize) -> Self {
        self.start_size = start_size;
        self
    }

    pub fn schedule(mut self, schedule: GrowthSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn budget(&self) -> Option<f64> {
        self.budget
    }

    /// Plan the sweep for one edge probability. `cap` is an absolute upper
    /// bound on the vertex count (inclusive).
    pub fn plan(&self, prob: f64, cap: Option<usize>) -> Result<Vec<usize>, PlanError> {
        if !(prob > 0.0 && prob <= 1.0) {
            return Err(PlanError::InvalidProbability(prob));
        }
        if let Some(budget) = self.budget {
            if !(budget.is_finite() && budget > 0.0) {
                return Err(PlanError::InvalidBudget(budget));
            }
        }
        if self.budget.is_none() && cap.is_none() {
            return Err(PlanError::Unbounded(prob));
        }
        if self.start_size == 0 {
            return Err(PlanError::ZeroStartSize);
        }
        self.schedule.validate()?;

        let mut sizes = Vec::new();
        let mut size = self.start_size;
        loop {
            if self.budget.is_some_and(|b| cost(size, prob) > b) {
                break;
            }
            if cap.is_some_and(|c| size > c) {
                break;
            }
            sizes.push(size);
            match size.checked_add(self.schedule.step_at(size)) {
                Some(next) => size = next,
                None => break,
            }
        }
        Ok(sizes)
    }
}

/// Plan with the default schedule.
pub fn plan(
    prob: f64,
    budget: Option<f64>,
    start_size: usize,
    cap: Option<usize>,
) -> Result<Vec<usize>, PlanError> {
    SizeSweepPlanner::new(budget)
        .start_size(start_size)
        .plan(prob, cap)
}
