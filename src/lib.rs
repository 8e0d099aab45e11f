//! `sales-insights` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - analysis passes are testable without spawning processes
//! - reports can be routed to any `ReportSink` (files, console, memory)
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod stats;
