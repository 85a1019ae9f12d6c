#![allow(unused)]

use std::{
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use sssp_harness::{sweep::SweepSummary, Cli, Commands};
use tempdir::TempDir;

/// Scripts are written and executed by every test. Serializing the tests keeps a
/// script from being exec'd while another thread holds it open for writing.
pub static SYNC: Mutex<()> = Mutex::new(());

/// Samples printed by the fake executables. The trimmed mean of `1..=9` is 5.
pub const SLOW_SAMPLES: &str = "1.000000 2.000000 3.000000 4.000000 5.000000 6.000000 7.000000 8.000000 9.000000";
/// Trimmed mean 2.5, a speedup of 2 over [`SLOW_SAMPLES`].
pub const FAST_SAMPLES: &str = "0.500000 1.000000 1.500000 2.000000 2.500000 3.000000 3.500000 4.000000 4.500000";

/// Behaviour of a fake benchmark executable.
pub struct Fake {
    pub samples: &'static str,
    /// Shell condition on `$vertices` and `$prob` that makes the run exit with 1
    pub fail_if: Option<&'static str>,
    pub hang: bool,
    pub write_graph: bool,
}

impl Default for Fake {
    fn default() -> Self {
        Self {
            samples: SLOW_SAMPLES,
            fail_if: None,
            hang: false,
            write_graph: true,
        }
    }
}

impl Fake {
    pub fn fast() -> Self {
        Self {
            samples: FAST_SAMPLES,
            ..Self::default()
        }
    }

    fn script(&self, name: &str) -> String {
        let mut s = String::from("#!/bin/sh\n");
        s += &format!("echo \"{} $*\" >> calls.log\n", name);
        s += r#"save=0
graph=""
vertices=""
prob=""
while [ $# -gt 0 ]; do
  case "$1" in
    --vertices) vertices="$2"; shift 2 ;;
    --prob) prob="$2"; shift 2 ;;
    --delta) shift 2 ;;
    --save) save=1; shift ;;
    *) graph="$1"; shift ;;
  esac
done
"#;
        if let Some(cond) = self.fail_if {
            s += &format!("if {}; then echo \"failed at $vertices\" >&2; exit 1; fi\n", cond);
        }
        if self.hang {
            s += "exec sleep 30\n";
        }
        if self.write_graph {
            s += "if [ $save = 1 ]; then echo \"graph $vertices $prob\" > graph.txt; fi\n";
        }
        s += "if [ $save = 0 ] && [ ! -f \"$graph\" ]; then echo \"no graph: $graph\" >&2; exit 3; fi\n";
        s += &format!(
            "for t in {}; do echo \"Время работы реализация: $t секунд\"; done\n",
            self.samples
        );
        s
    }
}

pub struct TestBench {
    temp_dir: TempDir,
}

impl TestBench {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new("sssp-harness")?;
        println!("Creating test bench in {}", temp_dir.path().display());
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn file(&self, path: impl AsRef<str>, content: impl AsRef<str>) -> anyhow::Result<()> {
        let full_path = self.path().join(path.as_ref());
        if let Some(dir) = full_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(full_path, content.as_ref())?;
        Ok(())
    }

    pub fn read(&self, path: impl AsRef<str>) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(self.path().join(path.as_ref()))?)
    }

    pub fn exists(&self, path: impl AsRef<str>) -> bool {
        self.path().join(path.as_ref()).exists()
    }

    /// Write `./<name>` as an executable script.
    pub fn executable(&self, name: &str, fake: Fake) -> anyhow::Result<()> {
        let path = self.path().join(name);
        std::fs::write(&path, fake.script(name))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
        Ok(())
    }

    /// Write `sweep.toml` with a `default` profile. `implementations` are `(label, script)` pairs.
    pub fn config(&self, implementations: &[(&str, &str)], extra: &str) -> anyhow::Result<()> {
        let mut s = format!("[profiles.default]\n{}\n", extra);
        for (label, exe) in implementations {
            s += &format!(
                "\n[[profiles.default.implementations]]\nlabel = \"{}\"\nexecutable = \"./{}\"\n",
                label, exe
            );
        }
        self.file("sweep.toml", s)
    }

    fn config_path(&self) -> String {
        self.path().join("sweep.toml").to_string_lossy().into_owned()
    }

    fn cli(&self, command: &str, args: &[&str]) -> Cli {
        let config = self.config_path();
        let mut cmd_args = vec!["sssp-harness", command, "--config", config.as_str()];
        if command == "run" {
            cmd_args.extend_from_slice(&["--allow-multi-user", "--allow-any-scaling-governor"]);
        }
        cmd_args.extend_from_slice(args);
        Cli::parse_from(cmd_args)
    }

    pub fn run(&self, args: &[&str]) -> anyhow::Result<SweepSummary> {
        match self.cli("run", args).command {
            Commands::Run(cmd) => cmd.run(),
            _ => unreachable!(),
        }
    }

    pub fn entry(&self, command: &str, args: &[&str]) -> anyhow::Result<()> {
        sssp_harness::entry(&self.cli(command, args))
    }

    /// One line per invocation: the script name followed by its arguments.
    pub fn calls(&self) -> Vec<String> {
        self.read("calls.log")
            .map(|s| s.lines().map(|l| l.to_owned()).collect())
            .unwrap_or_default()
    }

    pub fn clear_calls(&self) -> anyhow::Result<()> {
        let path = self.path().join("calls.log");
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn results(&self) -> anyhow::Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.read("results.json")?)?)
    }

    pub fn latest_log(&self, file: &str) -> anyhow::Result<String> {
        self.read(format!("logs/latest/{}", file))
    }
}
