//! Invoking one external benchmark executable.
//!
//! The invocation contract is `--vertices <n> --prob <p> [--delta <d>]` followed
//! by either `--save` (generate a fresh random graph and write it to the graph
//! file) or the path of a previously generated graph file.

use std::{
    collections::HashMap,
    fs::OpenOptions,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    error::ExecError,
    extract::Extractor,
    scenario::{format_prob, Scenario},
};

/// A pre-built benchmark executable and the label its timings are reported under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub label: String,
    pub executable: PathBuf,
    /// Extra environment variables for this implementation only
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Implementation {
    pub fn new(label: impl Into<String>, executable: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            executable: executable.into(),
            env: HashMap::new(),
        }
    }

    /// File name of this implementation's invocation log.
    pub fn log_name(&self) -> String {
        let stem: String = self
            .label
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}.log", stem)
    }
}

/// One (scenario, vertex count) unit of work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub scenario: Scenario,
    pub vertices: usize,
}

/// How an invocation obtains its input graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMode<'a> {
    /// Generate a fresh graph and write it to the shared graph file
    Regenerate,
    /// Load the graph file written earlier for the same cell
    Reuse(&'a Path),
}

/// Command-line arguments for one invocation.
pub fn invocation_args(cell: &Cell, graph: GraphMode) -> Vec<String> {
    let mut args = vec![
        "--vertices".to_owned(),
        cell.vertices.to_string(),
        "--prob".to_owned(),
        format_prob(cell.scenario.prob),
    ];
    if let Some(delta) = cell.scenario.delta {
        args.push("--delta".to_owned());
        args.push(delta.to_string());
    }
    match graph {
        GraphMode::Regenerate => args.push("--save".to_owned()),
        GraphMode::Reuse(path) => args.push(path.to_string_lossy().into_owned()),
    }
    args
}

/// Relative paths with a directory component are taken relative to `work_dir`.
/// Bare names are left for `PATH` lookup.
pub fn resolve_executable(work_dir: &Path, executable: &Path) -> PathBuf {
    if executable.is_absolute() || executable.components().count() <= 1 {
        executable.to_owned()
    } else {
        work_dir.join(executable)
    }
}

/// Runs one benchmark binary per call. Anything that executes a cell can stand
/// in for it, see [`CellRunner`].
pub trait CellRunner {
    fn run(
        &self,
        implementation: &Implementation,
        cell: &Cell,
        graph: GraphMode,
    ) -> Result<f64, ExecError>;
}

pub struct ExecutionAdapter {
    work_dir: PathBuf,
    graph_file: PathBuf,
    env: HashMap<String, String>,
    timeout: Option<Duration>,
    extractor: Extractor,
    log_dir: Option<PathBuf>,
}

impl ExecutionAdapter {
    /// `graph_file` is relative to `work_dir`; it is where `--save` runs leave the graph.
    pub fn new(work_dir: impl Into<PathBuf>, graph_file: impl Into<PathBuf>, extractor: Extractor) -> Self {
        Self {
            work_dir: work_dir.into(),
            graph_file: graph_file.into(),
            env: HashMap::new(),
            timeout: None,
            extractor,
            log_dir: None,
        }
    }

    pub fn env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append every invocation's command line and output to `<log_dir>/<label>.log`.
    pub fn log_dir(mut self, log_dir: Option<PathBuf>) -> Self {
        self.log_dir = log_dir;
        self
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn graph_file(&self) -> &Path {
        &self.graph_file
    }

    fn command(&self, implementation: &Implementation, cell: &Cell, graph: GraphMode) -> (Command, HashMap<String, String>) {
        let executable = resolve_executable(&self.work_dir, &implementation.executable);
        let mut cmd = Command::new(executable);
        cmd.current_dir(&self.work_dir)
            .args(invocation_args(cell, graph))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut envs = self.env.clone();
        for (k, v) in &implementation.env {
            envs.insert(k.clone(), v.clone());
        }
        cmd.envs(&envs);
        (cmd, envs)
    }

    /// Dump invocation-related metadata and the captured output to the implementation's log file
    fn log_invocation(
        &self,
        implementation: &Implementation,
        cmd: &Command,
        envs: &HashMap<String, String>,
        captured: Option<&Captured>,
    ) -> io::Result<()> {
        let Some(log_dir) = &self.log_dir else {
            return Ok(());
        };
        std::fs::create_dir_all(log_dir)?;
        let mut f = OpenOptions::new()
            .append(true)
            .create(true)
            .open(log_dir.join(implementation.log_name()))?;
        writeln!(f, "---")?;
        let prog = cmd.get_program().to_string_lossy();
        let args = cmd
            .get_args()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>();
        writeln!(f, "command: {} {}", prog.as_ref(), args.join(" "))?;
        writeln!(f, "env:")?;
        let mut keys = envs.keys().collect::<Vec<_>>();
        keys.sort();
        for k in keys {
            writeln!(f, "  {}: {}", k, envs[k])?;
        }
        match captured {
            Some(c) => writeln!(f, "status: {}", c.status)?,
            None => writeln!(f, "status: timed out")?,
        }
        writeln!(f, "---")?;
        if let Some(c) = captured {
            f.write_all(c.stdout.as_bytes())?;
            if !c.stderr.is_empty() {
                writeln!(f, "--- stderr")?;
                f.write_all(c.stderr.as_bytes())?;
            }
        }
        writeln!(f, "\n\n")?;
        Ok(())
    }
}

impl CellRunner for ExecutionAdapter {
    fn run(
        &self,
        implementation: &Implementation,
        cell: &Cell,
        graph: GraphMode,
    ) -> Result<f64, ExecError> {
        let (mut cmd, envs) = self.command(implementation, cell, graph);
        let executable = PathBuf::from(cmd.get_program());
        debug!("Running {:?} {:?}", executable, invocation_args(cell, graph));
        if graph == GraphMode::Regenerate {
            // A stale graph from an earlier cell must not satisfy the check below
            let graph = self.work_dir.join(&self.graph_file);
            match std::fs::remove_file(&graph) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => {
                    return Err(ExecError::StaleGraph { graph, source: e });
                }
                _ => {}
            }
        }
        let child = cmd.spawn().map_err(|source| ExecError::Launch {
            executable: executable.clone(),
            source,
        })?;
        let captured = match wait_captured(child, self.timeout) {
            Ok(Some(captured)) => captured,
            Ok(None) => {
                self.log_invocation(implementation, &cmd, &envs, None)
                    .map_err(ExecError::Log)?;
                return Err(ExecError::Timeout {
                    executable,
                    secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                });
            }
            Err(source) => return Err(ExecError::Launch { executable, source }),
        };
        self.log_invocation(implementation, &cmd, &envs, Some(&captured))
            .map_err(ExecError::Log)?;
        if !captured.status.success() {
            return Err(ExecError::ExitStatus {
                executable,
                status: captured.status,
                stdout: captured.stdout,
                stderr: captured.stderr,
            });
        }
        if graph == GraphMode::Regenerate && !self.work_dir.join(&self.graph_file).is_file() {
            return Err(ExecError::GraphNotWritten {
                executable,
                graph: self.work_dir.join(&self.graph_file),
            });
        }
        let average = self
            .extractor
            .extract(&captured.stdout)
            .map_err(|source| ExecError::Extract {
                executable,
                source,
                stdout: captured.stdout,
            })?;
        debug!(
            "{} at {} vertices: average = {:.6}s",
            implementation.label, cell.vertices, average
        );
        Ok(average)
    }
}

struct Captured {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

fn drain(pipe: Option<impl Read + Send + 'static>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Wait for `child` to exit, collecting its output. Returns `Ok(None)` if it was
/// killed for exceeding `timeout`.
fn wait_captured(mut child: Child, timeout: Option<Duration>) -> io::Result<Option<Captured>> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let status = match timeout {
        None => child.wait()?,
        Some(timeout) => {
            let deadline = Instant::now() + timeout;
            loop {
                match child.try_wait()? {
                    Some(status) => break status,
                    None if Instant::now() >= deadline => {
                        let _ = child.kill();
                        let _ = child.wait();
                        // Readers are detached: grandchildren may still hold the pipes
                        return Ok(None);
                    }
                    None => thread::sleep(Duration::from_millis(20)),
                }
            }
        }
    };
    let join = |h: thread::JoinHandle<String>| {
        h.join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output reader panicked"))
    };
    Ok(Some(Captured {
        status,
        stdout: join(stdout)?,
        stderr: join(stderr)?,
    }))
}
