use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

/// Invalid sweep parameters.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("edge probability must be in (0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("cost budget must be a positive number, got {0}")]
    InvalidBudget(f64),
    #[error("start size must be positive")]
    ZeroStartSize,
    #[error("growth step for sizes below {below} must be positive")]
    ZeroStep { below: usize },
    #[error("sweep for edge probability {0} is unbounded: set a cost budget or a size cap")]
    Unbounded(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum ExtractError {
    #[error("invalid timing pattern: {0}")]
    InvalidPattern(String),
    #[error("no timing samples found")]
    NoSamples,
    #[error("only {found} timing samples found, at least {required} required")]
    InsufficientSamples { found: usize, required: usize },
}

/// Failure of one (implementation, cell) invocation.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch `{}`: {source}", executable.display())]
    Launch {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("`{}` exited with {status}", executable.display())]
    ExitStatus {
        executable: PathBuf,
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    #[error("`{}` did not finish within {secs} s", executable.display())]
    Timeout { executable: PathBuf, secs: u64 },
    #[error("`{}`: {source}", executable.display())]
    Extract {
        executable: PathBuf,
        #[source]
        source: ExtractError,
        stdout: String,
    },
    #[error("`{}` was asked to save the graph but `{}` was not written", executable.display(), graph.display())]
    GraphNotWritten { executable: PathBuf, graph: PathBuf },
    #[error("could not remove the previous graph `{}`: {source}", graph.display())]
    StaleGraph {
        graph: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write invocation log: {0}")]
    Log(#[source] io::Error),
}

impl ExecError {
    /// Raw process output attached to this failure, if any. Both streams are
    /// shown when both carry something.
    pub fn captured_output(&self) -> Option<String> {
        match self {
            ExecError::ExitStatus { stdout, stderr, .. } => {
                let (stdout, stderr) = (stdout.trim_end(), stderr.trim_end());
                match (stdout.is_empty(), stderr.is_empty()) {
                    (true, true) => None,
                    (false, true) => Some(stdout.to_owned()),
                    (true, false) => Some(stderr.to_owned()),
                    (false, false) => Some(format!("{}\n--- stderr ---\n{}", stdout, stderr)),
                }
            }
            ExecError::Extract { stdout, .. } => Some(stdout.clone()),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SpeedupError {
    #[error("baseline has {baseline} timings but variant has {variant}")]
    LengthMismatch { baseline: usize, variant: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to persist `{}` after retry: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("stored results for `{key}` are stale: {reason}")]
    Stale { key: String, reason: String },
    #[error("cannot record {got} timings for `{key}`, expected {expected}")]
    TimingCount {
        key: String,
        expected: usize,
        got: usize,
    },
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("invalid execution plan: {0}")]
    InvalidPlan(String),
    #[error("{key} at {vertices} vertices: {source}")]
    Cell {
        key: String,
        vertices: usize,
        #[source]
        source: ExecError,
    },
    #[error("no graph has been generated for {key} at {vertices} vertices")]
    GraphUnavailable { key: String, vertices: usize },
}

impl SweepError {
    /// The failed invocation behind this error, if it came from a benchmark run.
    pub fn exec_error(&self) -> Option<&ExecError> {
        match self {
            SweepError::Cell { source, .. } => Some(source),
            _ => None,
        }
    }
}
