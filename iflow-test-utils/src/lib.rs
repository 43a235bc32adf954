//! Test utilities for iflow-tools
//!
//! Builders for throwaway git repositories laid out like a package
//! repository, and fake tool binaries that record how they were called.

pub mod builders;
pub mod mocks;

// Re-export commonly used types
pub use builders::{TestRepo, TestRepoBuilder};
pub use mocks::{FakeTool, RecordedCall};
