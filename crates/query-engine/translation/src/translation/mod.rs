//! Translate fetch query text into the query shape the flattener walks, and prepare
//! fetch templates for execution.

pub mod cache;
pub mod error;
pub mod prepare;
pub mod query;
