use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use colored::Colorize;
use log::warn;

use crate::{
    charts::{ChartRenderer, ExternalPlotter, ScenarioSeries, SeriesExporter},
    configs::{harness::LoadedProfile, run_info::RunInfo},
    sweep::{
        Cell, ExecError, ExecutionAdapter, ExecutionPlan, Implementation, ResultCatalog,
        ResultStore, Scenario, SweepDriver, SweepObserver, SweepSummary,
    },
    utils::md::MarkdownPrinter,
};

use super::RunArgs;

const KEYS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn key_of(index: usize) -> String {
    KEYS.chars()
        .nth(index)
        .map(|c| c.to_string())
        .unwrap_or_else(|| "?".to_owned())
}

/// Prints one line per scenario: every vertex size, then one key per implementation.
struct ConsoleProgress {
    name_len: usize,
}

impl ConsoleProgress {
    fn new(scenarios: &[Scenario]) -> Self {
        Self {
            name_len: scenarios.iter().map(|s| s.key().len()).max().unwrap_or(0) + 3,
        }
    }

    fn print_key(&self, scenario: &Scenario) {
        let key = scenario.key();
        print!("{}", key.blue().bold());
        (key.len()..self.name_len).for_each(|_| print!(" "));
    }
}

fn flush() {
    let _ = io::stdout().flush();
}

impl SweepObserver for ConsoleProgress {
    fn scenario_started(&mut self, scenario: &Scenario, sweep: &[usize], resume_from: usize) {
        self.print_key(scenario);
        if resume_from > 0 {
            print!("{}", format!("(resumed at {})", sweep[resume_from]).dimmed());
        }
        flush();
    }

    fn scenario_reused(&mut self, scenario: &Scenario, sweep: &[usize]) {
        self.print_key(scenario);
        println!("{}", format!("✔ cached, {} sizes", sweep.len()).dimmed());
    }

    fn cell_started(&mut self, cell: &Cell) {
        print!(" {}", cell.vertices.to_string().bold().blue().italic());
        flush();
    }

    fn invocation_finished(
        &mut self,
        _cell: &Cell,
        index: usize,
        _implementation: &Implementation,
        result: &Result<f64, ExecError>,
    ) {
        match result {
            Ok(_) => print!("{}", key_of(index).green()),
            Err(_) => print!("{}", "✘".red()),
        }
        flush();
    }

    fn scenario_finished(&mut self, _scenario: &Scenario) {
        println!();
    }
}

/// Drives one `run`: the sweep itself, then the charts.
pub struct SweepRunner<'a> {
    loaded: &'a LoadedProfile,
    plan: &'a ExecutionPlan,
    run: &'a RunInfo,
    log_dir: &'a Path,
}

impl<'a> SweepRunner<'a> {
    pub const MAX_SUPPORTED_IMPLEMENTATIONS: usize = KEYS.len();

    pub fn new(
        loaded: &'a LoadedProfile,
        plan: &'a ExecutionPlan,
        run: &'a RunInfo,
        log_dir: &'a Path,
    ) -> Self {
        Self {
            loaded,
            plan,
            run,
            log_dir,
        }
    }

    fn print_before_run(&self, store: &ResultStore, scenarios: &[Scenario]) {
        print_md!("# {}\n\n", self.run.runid);
        print_md!("* logs: `{}`", self.log_dir.display());
        print_md!("* results: `{}`", store.path().display());
        print_md!("* scenarios: `{}`", scenarios.len());
        if let Some(budget) = self.loaded.profile.budget {
            print_md!("* budget: `{:e}`", budget);
        }
        println!();
        let mut printer = MarkdownPrinter::new();
        let rows = self
            .plan
            .implementations()
            .enumerate()
            .map(|(i, imp)| {
                vec![
                    format!("`{}`", key_of(i)),
                    imp.label.clone(),
                    format!("`{}`", imp.executable.display()),
                ]
            })
            .collect::<Vec<_>>();
        printer.add_table(
            &["key".to_owned(), "implementation".to_owned(), "executable".to_owned()],
            &rows,
        );
        printer.dump();
        println!("{}\n", "Running Benchmarks...".blue());
    }

    fn print_after_run(&self, summary: &SweepSummary, charts: &[PathBuf]) {
        println!("\n{}\n", "✔ Benchmarking Finished.".green());
        print_md!("* cells executed: `{}`", summary.cells);
        print_md!("* scenarios completed: `{}`", summary.completed.len());
        print_md!("* scenarios reused: `{}`", summary.reused.len());
        if !summary.discarded.is_empty() {
            print_md!("* stale scenarios recomputed: `{}`", summary.discarded.join(", "));
        }
        for failure in &summary.failed {
            eprintln!(
                "{} {} skipped at {} vertices: {} failed: {}",
                "✘".red(),
                failure.key.bold(),
                failure.vertices,
                failure.label,
                failure.error.to_string().red()
            );
        }
        if !charts.is_empty() {
            print_md!("\nChart data at:\n");
            for path in charts {
                print_md!("* `{}`", path.display());
            }
        }
        print_md!("\nPlease run `sssp-harness report` to view results.\n");
    }

    fn renderer(&self) -> anyhow::Result<Box<dyn ChartRenderer>> {
        let out_dir = self.loaded.charts_dir();
        Ok(match &self.loaded.profile.plot_command {
            Some(command) => Box::new(ExternalPlotter::new(command.clone(), out_dir)?),
            None => Box::new(SeriesExporter::new(out_dir)),
        })
    }

    /// Chart every scenario with recorded sizes, partial ones included. Failures are
    /// reported but do not fail the run.
    fn render_charts(&self, catalog: &ResultCatalog, scenarios: &[Scenario]) -> Vec<PathBuf> {
        let renderer = match self.renderer() {
            Ok(r) => r,
            Err(e) => {
                warn!("Charts disabled: {}", e);
                return Vec::new();
            }
        };
        let labels = self.plan.labels();
        let mut written = Vec::new();
        for scenario in scenarios {
            let key = scenario.key();
            let Some(result) = catalog.get(&key).filter(|r| !r.vertices.is_empty()) else {
                continue;
            };
            let rendered = ScenarioSeries::from_result(*scenario, result, &labels)
                .map_err(anyhow::Error::from)
                .and_then(|series| renderer.render(&series));
            match rendered {
                Ok(paths) => written.extend(paths),
                Err(e) => warn!("Failed to chart {}: {}", key, e),
            }
        }
        written
    }

    pub fn run(&self, args: &RunArgs) -> anyhow::Result<SweepSummary> {
        let profile = &self.loaded.profile;
        let adapter = ExecutionAdapter::new(
            self.loaded.work_dir(),
            &profile.graph_file,
            profile.sampling.extractor()?,
        )
        .env(profile.env.clone())
        .timeout(profile.timeout_duration())
        .log_dir(Some(self.log_dir.to_owned()));
        let store = ResultStore::new(self.loaded.results_path());
        let mut catalog = store.load()?;
        let planner = profile.planner();
        let caps = |prob: f64| profile.cap_for(prob);
        let scenarios = profile.scenarios();
        self.print_before_run(&store, &scenarios);
        let mut driver = SweepDriver::new(
            &adapter,
            &store,
            self.plan,
            &planner,
            adapter.graph_file().to_owned(),
        )
        .caps(&caps)
        .policy(profile.on_failure)
        .discard_stale(args.discard_stale);
        let mut progress = ConsoleProgress::new(&scenarios);
        let summary = match driver.run_observed(&mut catalog, &scenarios, &mut progress) {
            Ok(summary) => summary,
            Err(e) => {
                if let Some(exec) = e.exec_error() {
                    if let Some(output) = exec.captured_output() {
                        eprintln!("{}", "Output of the failed invocation:".red().bold());
                        eprintln!("{}", output);
                    }
                    // The prefix recorded before the failure is still worth a chart
                    if !args.no_charts {
                        self.render_charts(&catalog, &scenarios);
                    }
                }
                return Err(e.into());
            }
        };
        let charts = if args.no_charts {
            Vec::new()
        } else {
            self.render_charts(&catalog, &scenarios)
        };
        self.print_after_run(&summary, &charts);
        Ok(summary)
    }
}
