//! Stage dwell-time analytics over the production event log.
//!
//! Everything here is a pure function of a data snapshot and a
//! [`ViewContext`]; persistence lives in `crate::store`.

pub mod context;
pub mod current;
pub mod duration;
pub mod report;
pub mod stats;
pub mod traffic;

pub use context::{Period, ViewContext};
pub use current::{current_stage_for, CurrentStage};
pub use report::{build_report, order_timeline, OrderHealth, ProductionReport, TimelineEntry};
pub use stats::StageStats;
pub use traffic::TrafficLight;
