//! Run reporting.
//!
//! Collects what happened during a censoring run into a JSON-serializable
//! diagnostic report.

pub mod diagnostics;

pub use diagnostics::{DiagnosticReport, MessageLevel, ReportMessage, SegmentReport};
