use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use log::warn;

use crate::{
    charts::{ChartRenderer, ScenarioSeries, SeriesExporter},
    commands::ProfileArgs,
    configs::run_info::RunInfo,
    sweep::{ResultStore, Scenario},
    utils::md::MarkdownPrinter,
};

pub mod data;

/// Summarize the cached results
#[derive(Parser, Debug)]
pub struct ReportArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,
    /// Override the result cache path
    #[arg(long)]
    pub results: Option<PathBuf>,
    /// Only report scenarios whose key contains this string
    #[arg(long)]
    pub scenario: Option<String>,
    /// The run id whose summary is printed. Default to the latest run.
    #[arg(long)]
    pub run_id: Option<String>,
    /// Re-export the chart series as CSV files
    #[arg(long, default_value = "false")]
    pub csv: bool,
}

fn format_time(t: i64) -> String {
    DateTime::<Utc>::from_timestamp(t, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "N/A".to_owned())
}

impl ReportArgs {
    fn add_run_header(&self, printer: &mut MarkdownPrinter, run: &RunInfo) {
        printer.add(format!("* Run ID: `{}`\n", run.runid));
        printer.add(format!(
            "* Start Time (UTC): `{}`\n",
            format_time(run.start_timestamp_utc)
        ));
        match run.finish_timestamp_utc {
            Some(t) => printer.add(format!("* Finish Time (UTC): `{}`\n", format_time(t))),
            None => printer.add("* Finish Time (UTC): `N/A`\n"),
        }
        printer.add(format!("* Commit: `{}`\n", run.commit));
        printer.add(format!("* OS: `{}`\n", run.system.os));
        printer.add(format!("* CPU: `{}`\n", run.system.cpu_model));
        printer.add(format!("* Memory: `{} GB`\n", run.system.memory_size >> 30));
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let loaded = self.profile.load()?;
        let labels = loaded.profile.execution_plan()?.labels();
        let results = match &self.results {
            Some(p) => std::env::current_dir()?.join(p),
            None => loaded.results_path(),
        };
        let store = ResultStore::new(&results);
        if !store.path().is_file() {
            anyhow::bail!("Benchmark results not found: {}", results.display());
        }
        let catalog = store.load()?;
        let mut series = Vec::new();
        for (key, result) in catalog.iter() {
            if self.scenario.as_ref().is_some_and(|f| !key.contains(f.as_str())) {
                continue;
            }
            let Some(scenario) = Scenario::from_key(key) else {
                warn!("Skipping unrecognized scenario key `{}`", key);
                continue;
            };
            let series_labels = if result.labels.is_empty() { &labels } else { &result.labels };
            if series_labels.len() != result.avgs.len() {
                warn!(
                    "Skipping {}: {} timing series for {} implementations",
                    key,
                    result.avgs.len(),
                    series_labels.len()
                );
                continue;
            }
            match ScenarioSeries::from_result(scenario, result, &labels) {
                Ok(s) => series.push(s),
                Err(e) => warn!("Skipping {}: {}", key, e),
            }
        }
        // Print results
        let mut printer = MarkdownPrinter::new();
        printer.add(format!("# [{}] Benchmark Results Summary\n\n", loaded.name));
        let log_dir = loaded
            .logs_dir()
            .join(self.run_id.as_deref().unwrap_or("latest"));
        match RunInfo::load(&log_dir.join("config.toml")) {
            Ok(run) => self.add_run_header(&mut printer, &run),
            Err(_) if self.run_id.is_some() => {
                anyhow::bail!("Run summary not found: {}", log_dir.display())
            }
            Err(_) => {}
        }
        printer.add(format!("* Results: `{}`\n", results.display()));
        for s in &series {
            printer.add(format!("\n## {}\n\n", s.scenario.title()));
            printer.add("### Seconds\n\n");
            printer.add_dataframe(&s.timings_frame()?);
            if !s.speedups.is_empty() {
                printer.add("\n### Speedup\n\n");
                printer.add_dataframe(&s.speedups_frame()?);
            }
        }
        let points = data::speedup_points(&series)?;
        if points.height() > 0 {
            printer.add("\n## Speedup At The Largest Size\n\n");
            printer.add_dataframe(&data::largest_size_speedups(&points)?);
            printer.add("\n## Speedup Summary\n\n");
            printer.add_dataframe(&data::speedup_summary(&points)?);
        }
        printer.dump();
        if self.csv {
            let exporter = SeriesExporter::new(loaded.charts_dir());
            for s in &series {
                for path in exporter.render(s)? {
                    print_md!("* `{}`", path.display());
                }
            }
        }
        Ok(())
    }
}
