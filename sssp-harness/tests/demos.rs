use std::path::{Path, PathBuf};

use sssp_harness::{
    configs::harness::{LoadedProfile, SweepConfig},
    sweep::{Progress, ResultCatalog, ScenarioResult},
};

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("demos")
        .join(name)
}

fn load(name: &str) -> anyhow::Result<LoadedProfile> {
    SweepConfig::load_profile(&demo(name), "default")
}

/// The size ladder the benchmark scripts walked before this harness existed.
fn ladder(start: usize, keep: impl Fn(usize) -> bool) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut v = start;
    while keep(v) {
        sizes.push(v);
        v += match v {
            v if v < 500 => 100,
            v if v < 1000 => 500,
            v if v < 10000 => 1000,
            v if v < 20000 => 2500,
            _ => 5000,
        };
    }
    sizes
}

#[test]
fn test_bellman_ford_demo_matches_history() -> anyhow::Result<()> {
    let loaded = load("bellman-ford.toml")?;
    let profile = &loaded.profile;
    assert_eq!(
        profile.probabilities,
        vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9]
    );
    assert_eq!(profile.deltas, None);
    let planner = profile.planner();
    for &prob in &profile.probabilities {
        let expected = ladder(100, |v| (v * v) as f64 * prob < 3e8);
        assert_eq!(planner.plan(prob, profile.cap_for(prob))?, expected, "p = {}", prob);
    }
    let keys = profile.scenarios().iter().map(|s| s.key()).collect::<Vec<_>>();
    assert_eq!(keys[0], "prob_0.1");
    assert_eq!(keys[8], "prob_0.9");
    Ok(())
}

#[test]
fn test_delta_stepping_demo_matches_history() -> anyhow::Result<()> {
    let loaded = load("delta-stepping.toml")?;
    let profile = &loaded.profile;
    assert_eq!(profile.budget, None);
    let planner = profile.planner();
    let sweep = planner.plan(0.9, profile.cap_for(0.9))?;
    let expected = ladder(1000, |v| v <= 20000);
    assert_eq!(sweep, expected);
    assert_eq!(sweep.len(), 14);
    assert_eq!(&sweep[sweep.len() - 3..], &[15000, 17500, 20000]);
    // A finished scenario left by the old script is reused as is
    let labels = profile.execution_plan()?.labels();
    let mut catalog = ResultCatalog::new();
    catalog.insert(
        "prob_0.9_delta_60",
        ScenarioResult {
            avgs: vec![vec![1.0; sweep.len()]; labels.len()],
            vertices: expected,
            labels: Vec::new(),
        },
    );
    assert_eq!(
        catalog.progress("prob_0.9_delta_60", &sweep, &labels),
        Progress::Complete
    );
    let keys = profile.scenarios().iter().map(|s| s.key()).collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec!["prob_0.9_delta_1", "prob_0.9_delta_60", "prob_0.9_delta_100"]
    );
    Ok(())
}
