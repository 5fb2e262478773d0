//! Shared infrastructure for integration tests.

pub mod goldenfiles;
pub mod logging;
