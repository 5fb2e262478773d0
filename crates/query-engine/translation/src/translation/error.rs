//! Errors for query shape translation.

use query_engine_fetch::fetch;
use thiserror::Error;

/// A fetch query whose shape cannot be mapped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid fetch query: {0}")]
    Malformed(#[from] fetch::parse::Error),
    #[error("fetch query has no <entity> element")]
    MissingEntity,
    #[error("<{element}> element has no table name")]
    MissingTableName { element: String },
    #[error(
        "primary id attribute '{primary_id}' (or activityid, if applicable) not found in fetch attributes{}",
        for_join(.table, .alias)
    )]
    InvalidQueryShape {
        table: String,
        alias: Option<String>,
        primary_id: String,
    },
    #[error("fetch template has no '{0}' placeholder for the target id")]
    MissingPlaceholder(&'static str),
}

fn for_join(table: &str, alias: &Option<String>) -> String {
    match alias {
        Some(alias) => format!(" for '{table}' with alias '{alias}'"),
        None => String::new(),
    }
}
