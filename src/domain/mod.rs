//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and calendar-enriched sales rows (`Transaction`, `SalesRecord`)
//! - grouping dimensions with exact ordering (`Season`, `DiscountLevel`)
//! - loyalty classes (`CustomerBehavior`)
//! - run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
