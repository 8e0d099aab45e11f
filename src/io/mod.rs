//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - transaction CSV export (`export`)
//! - report sinks for tables and charts (`sink`)
//! - run manifest JSON (`manifest`)

pub mod export;
pub mod ingest;
pub mod manifest;
pub mod sink;

pub use export::*;
pub use ingest::*;
pub use manifest::*;
pub use sink::*;
