#![cfg(unix)]

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

use helper::{Fake, TestBench};
use sssp_harness::{
    configs::harness::Sampling,
    sweep::{Cell, CellRunner, ExecError, ExecutionAdapter, GraphMode, Implementation, Scenario},
};

mod helper;

fn exit_status(stdout: &str, stderr: &str) -> ExecError {
    ExecError::ExitStatus {
        executable: "./main-cpp.o".into(),
        status: ExitStatus::from_raw(1 << 8),
        stdout: stdout.to_owned(),
        stderr: stderr.to_owned(),
    }
}

#[test]
fn test_captured_output_keeps_both_streams() {
    let output = exit_status("Generating graph\n", "Segmentation fault\n")
        .captured_output()
        .unwrap();
    assert!(output.contains("Generating graph"));
    assert!(output.contains("Segmentation fault"));
    assert_eq!(
        exit_status("", "Segmentation fault\n").captured_output(),
        Some("Segmentation fault".to_owned())
    );
    assert_eq!(
        exit_status("Generating graph\n", "").captured_output(),
        Some("Generating graph".to_owned())
    );
    assert_eq!(exit_status("", "").captured_output(), None);
    let timeout = ExecError::Timeout {
        executable: "./main-cpp.o".into(),
        secs: 1,
    };
    assert_eq!(timeout.captured_output(), None);
}

#[test]
fn test_unremovable_graph_fails_before_launch() -> anyhow::Result<()> {
    let _guard = helper::SYNC.lock().unwrap();
    let bench = TestBench::new()?;
    bench.executable("base.sh", Fake::default())?;
    // A directory where the graph should be cannot be removed as a file
    bench.file("graph.txt/keep", "")?;
    let adapter = ExecutionAdapter::new(bench.path(), "graph.txt", Sampling::default().extractor()?);
    let cell = Cell {
        scenario: Scenario::new(0.5, None),
        vertices: 100,
    };
    let err = adapter
        .run(&Implementation::new("base", "./base.sh"), &cell, GraphMode::Regenerate)
        .unwrap_err();
    assert!(matches!(err, ExecError::StaleGraph { .. }), "{}", err);
    assert!(bench.calls().is_empty());
    Ok(())
}

#[test]
fn test_regenerate_without_previous_graph() -> anyhow::Result<()> {
    let _guard = helper::SYNC.lock().unwrap();
    let bench = TestBench::new()?;
    bench.executable("base.sh", Fake::default())?;
    let adapter = ExecutionAdapter::new(bench.path(), "graph.txt", Sampling::default().extractor()?);
    let cell = Cell {
        scenario: Scenario::new(0.5, None),
        vertices: 100,
    };
    let average = adapter.run(&Implementation::new("base", "./base.sh"), &cell, GraphMode::Regenerate)?;
    assert_eq!(average, 5.0);
    assert!(bench.exists("graph.txt"));
    Ok(())
}
