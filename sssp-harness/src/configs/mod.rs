//! The sweep configuration file and the per-run metadata dumped next to the run logs.

pub mod harness;
pub mod run_info;
