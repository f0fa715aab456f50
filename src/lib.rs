// Allow dead code for public API functions that may not be used internally
// but are part of the library's exposed interface
#![allow(dead_code)]

pub mod address;
pub mod board;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod extract;
pub mod logger;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod report;

pub use pipeline::Pipeline;
pub use report::{ReportRecord, ReportStatus, RunSummary};
