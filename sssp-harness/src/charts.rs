//! Chart output. The harness only prepares the series; drawing is left to an
//! external plotting program.

use std::{
    fs::File,
    path::{Path, PathBuf},
    process::Command,
};

use polars::prelude::*;

use crate::sweep::{speedup, Scenario, ScenarioResult, SpeedupError};

/// Timing and speedup curves of one scenario, ready to be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSeries {
    pub scenario: Scenario,
    pub vertices: Vec<usize>,
    /// `(label, seconds)`, baseline first
    pub timings: Vec<(String, Vec<f64>)>,
    /// `(label, baseline / variant)` for every non-baseline implementation
    pub speedups: Vec<(String, Vec<f64>)>,
}

impl ScenarioSeries {
    /// `labels` names the series of results recorded without labels.
    /// The first series is the baseline.
    pub fn from_result(
        scenario: Scenario,
        result: &ScenarioResult,
        labels: &[String],
    ) -> Result<Self, SpeedupError> {
        let labels = if result.labels.is_empty() {
            labels
        } else {
            &result.labels
        };
        let timings: Vec<(String, Vec<f64>)> = labels
            .iter()
            .cloned()
            .zip(result.avgs.iter().cloned())
            .collect();
        let mut speedups = Vec::new();
        if let Some(((_, baseline), variants)) = timings.split_first() {
            for (label, times) in variants {
                speedups.push((label.clone(), speedup(baseline, times)?));
            }
        }
        Ok(Self {
            scenario,
            vertices: result.vertices.clone(),
            timings,
            speedups,
        })
    }

    /// File stem shared by every artifact of this scenario.
    pub fn stem(&self) -> String {
        self.scenario.key()
    }

    pub fn timings_frame(&self) -> PolarsResult<DataFrame> {
        frame(&self.vertices, &self.timings)
    }

    pub fn speedups_frame(&self) -> PolarsResult<DataFrame> {
        frame(&self.vertices, &self.speedups)
    }
}

fn frame(vertices: &[usize], series: &[(String, Vec<f64>)]) -> PolarsResult<DataFrame> {
    let mut columns = vec![Series::new(
        "vertices",
        vertices.iter().map(|&v| v as u64).collect::<Vec<_>>(),
    )];
    for (label, values) in series {
        columns.push(Series::new(label, values.as_slice()));
    }
    DataFrame::new(columns)
}

/// Produces chart artifacts for one scenario and returns their paths.
pub trait ChartRenderer {
    fn render(&self, series: &ScenarioSeries) -> anyhow::Result<Vec<PathBuf>>;
}

/// Writes `vertices_vs_time_<key>.csv` and, with more than one implementation,
/// `speedup_vs_vertices_<key>.csv`.
pub struct SeriesExporter {
    out_dir: PathBuf,
}

impl SeriesExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn timings_path(&self, series: &ScenarioSeries) -> PathBuf {
        self.out_dir
            .join(format!("vertices_vs_time_{}.csv", series.stem()))
    }

    pub fn speedups_path(&self, series: &ScenarioSeries) -> PathBuf {
        self.out_dir
            .join(format!("speedup_vs_vertices_{}.csv", series.stem()))
    }
}

fn write_csv(path: &Path, mut df: DataFrame) -> anyhow::Result<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

impl ChartRenderer for SeriesExporter {
    fn render(&self, series: &ScenarioSeries) -> anyhow::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.out_dir)?;
        let mut written = Vec::new();
        let timings = self.timings_path(series);
        write_csv(&timings, series.timings_frame()?)?;
        written.push(timings);
        if !series.speedups.is_empty() {
            let speedups = self.speedups_path(series);
            write_csv(&speedups, series.speedups_frame()?)?;
            written.push(speedups);
        }
        Ok(written)
    }
}

/// Exports the series, then hands them to an external plotting program:
///
/// ```text
/// <command...> --title <title> --timings <csv> --output <png>
///              [--speedups <csv> --speedup-output <png> --reference 1]
/// ```
///
/// The speedup chart is expected to draw a reference line at `--reference`.
pub struct ExternalPlotter {
    command: Vec<String>,
    exporter: SeriesExporter,
    out_dir: PathBuf,
}

impl ExternalPlotter {
    pub fn new(command: Vec<String>, out_dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        if command.is_empty() {
            anyhow::bail!("Empty plot command");
        }
        let out_dir = out_dir.into();
        Ok(Self {
            command,
            exporter: SeriesExporter::new(&out_dir),
            out_dir,
        })
    }
}

impl ChartRenderer for ExternalPlotter {
    fn render(&self, series: &ScenarioSeries) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = self.exporter.render(series)?;
        let timing_png = self
            .out_dir
            .join(format!("vertices_vs_time_{}.png", series.stem()));
        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..])
            .arg("--title")
            .arg(series.scenario.title())
            .arg("--timings")
            .arg(self.exporter.timings_path(series))
            .arg("--output")
            .arg(&timing_png);
        let speedup_png = self
            .out_dir
            .join(format!("speedup_vs_vertices_{}.png", series.stem()));
        if !series.speedups.is_empty() {
            cmd.arg("--speedups")
                .arg(self.exporter.speedups_path(series))
                .arg("--speedup-output")
                .arg(&speedup_png)
                .args(["--reference", "1"]);
        }
        let output = cmd
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to run plot command `{}`: {}", self.command[0], e))?;
        if !output.status.success() {
            anyhow::bail!(
                "Plot command failed for {}: {}",
                series.stem(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        written.push(timing_png);
        if !series.speedups.is_empty() {
            written.push(speedup_png);
        }
        Ok(written)
    }
}
