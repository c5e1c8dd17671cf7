//! # Analysis orchestration
//!
//! [`Analyzer`] turns raw signals into CWT and XWT results; [`run_batch`]
//! drives it over a directory of recordings.

pub mod batch;
pub mod core;

pub use self::batch::{run_batch, BatchReport};
pub use self::core::{time_axis, Analyzer, ApplianceResult, ComparisonResult};
