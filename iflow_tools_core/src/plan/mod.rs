//! Invocation planning for the wrapped tools

mod lint;
mod sync;

pub use lint::LintPlanner;
pub use sync::SyncPlanner;
