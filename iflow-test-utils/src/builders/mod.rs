//! Test fixture builders

mod repo;

pub use repo::{TestRepo, TestRepoBuilder};
