//! iflow-tools core library
//!
//! Repository layout discovery, version-control change detection and
//! parallel execution of the wrapped integration tools (CPILint and
//! flashpipe) over the packages and iFlows of a repository.

pub mod config;
pub mod error;
pub mod git;
pub mod invocation;
pub mod layout;
pub mod plan;
pub mod runner;

// Re-export main types
pub use config::{LintConfig, PackageSelection, SyncConfig, ToolsConfig};
pub use error::{Error, Result};
pub use git::ChangeSet;
pub use invocation::{Invocation, Job};
pub use layout::{IFlow, Layout, Package, PackageFilter};
pub use plan::{LintPlanner, SyncPlanner};
pub use runner::{JobOutcome, ParallelRunner, RunReport, StepOutcome, StepStatus};
