use polars::prelude::*;
use sssp_harness::{
    charts::ScenarioSeries,
    commands::report::data,
    sweep::{Scenario, ScenarioResult},
};

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn series() -> ScenarioSeries {
    ScenarioSeries {
        scenario: Scenario::new(0.5, None),
        vertices: vec![100, 200, 300],
        timings: vec![],
        speedups: vec![
            ("fast".to_owned(), vec![2.0, 8.0, 0.0]),
            ("slow".to_owned(), vec![0.5, 0.5, 0.5]),
        ],
    }
}

#[test]
fn test_series_from_result() -> anyhow::Result<()> {
    let result = ScenarioResult {
        avgs: vec![vec![2.0, 4.0], vec![1.0, 0.0], vec![4.0, 8.0]],
        vertices: vec![100, 200],
        labels: vec![],
    };
    let s = ScenarioSeries::from_result(
        Scenario::new(0.9, Some(60)),
        &result,
        &labels(&["C++", "DPC++", "OpenMP"]),
    )?;
    assert_eq!(s.stem(), "prob_0.9_delta_60");
    assert_eq!(s.timings[0].0, "C++");
    assert_eq!(s.speedups.len(), 2);
    assert_eq!(s.speedups[0], ("DPC++".to_owned(), vec![2.0, 0.0]));
    assert_eq!(s.speedups[1], ("OpenMP".to_owned(), vec![0.5, 0.5]));
    let timings = s.timings_frame()?;
    assert_eq!(timings.get_column_names(), vec!["vertices", "C++", "DPC++", "OpenMP"]);
    assert_eq!(timings.height(), 2);
    // Recorded labels win over the configured ones
    let labelled = ScenarioResult {
        labels: labels(&["a", "b", "c"]),
        ..result
    };
    let s = ScenarioSeries::from_result(Scenario::new(0.9, None), &labelled, &labels(&["x"]))?;
    assert_eq!(s.speedups[0].0, "b");
    Ok(())
}

#[test]
fn test_single_implementation_has_no_speedup() -> anyhow::Result<()> {
    let result = ScenarioResult {
        avgs: vec![vec![1.0]],
        vertices: vec![100],
        labels: vec![],
    };
    let s = ScenarioSeries::from_result(Scenario::new(0.5, None), &result, &labels(&["C++"]))?;
    assert!(s.speedups.is_empty());
    assert_eq!(data::speedup_points(&[s])?.height(), 0);
    Ok(())
}

#[test]
fn test_summary_skips_undefined_points() -> anyhow::Result<()> {
    let points = data::speedup_points(&[series()])?;
    assert_eq!(points.height(), 6);
    let summary = data::speedup_summary(&points)?;
    let variants = summary.column("variant")?;
    assert_eq!(variants.get(0)?.get_str(), Some("fast"));
    let n = summary.column("points")?.cast(&DataType::UInt32)?;
    assert_eq!(n.u32()?.get(0), Some(2));
    let geomean = summary.column("geomean")?.f64()?.clone();
    assert!((geomean.get(0).unwrap() - 4.0).abs() < 1e-9);
    assert!((geomean.get(1).unwrap() - 0.5).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_largest_size_is_the_last_point() -> anyhow::Result<()> {
    let points = data::speedup_points(&[series()])?;
    let largest = data::largest_size_speedups(&points)?;
    assert_eq!(largest.height(), 2);
    let speedup = largest.column("speedup")?.f64()?.clone();
    assert_eq!(speedup.get(0), Some(0.0));
    assert_eq!(speedup.get(1), Some(0.5));
    Ok(())
}
