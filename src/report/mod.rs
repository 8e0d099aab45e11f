//! Reporting utilities: report tables and formatted terminal output.

pub mod format;
pub mod table;

pub use format::*;
pub use table::*;
