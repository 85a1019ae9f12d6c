//! The sweep engine: planning vertex sizes, running the external benchmark
//! executables, reducing their timing output, and keeping the resumable
//! result cache.

pub mod driver;
pub mod error;
pub mod exec;
pub mod extract;
pub mod planner;
pub mod scenario;
pub mod speedup;
pub mod store;

pub use driver::{ExecutionPlan, FailurePolicy, SweepDriver, SweepObserver, SweepSummary};
pub use error::{ExecError, ExtractError, PlanError, SpeedupError, StoreError, SweepError};
pub use exec::{Cell, CellRunner, ExecutionAdapter, GraphMode, Implementation};
pub use extract::{Extractor, PatternExtractor, SampleExtractor, ShortSamples, TrimmedMean};
pub use planner::{GrowthSchedule, GrowthStep, SizeSweepPlanner};
pub use scenario::Scenario;
pub use speedup::speedup;
pub use store::{Progress, ResultCatalog, ResultStore, ScenarioResult};
