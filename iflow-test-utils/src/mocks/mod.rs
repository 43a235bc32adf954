//! Stand-ins for the wrapped binaries

mod tool;

pub use tool::{FakeTool, RecordedCall};
