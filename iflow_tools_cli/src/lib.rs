//! iflow-tools command line interface
//!
//! Library half of the `iflow-lint` and `iflow-sync` binaries.

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod paths;
pub mod terminal;
