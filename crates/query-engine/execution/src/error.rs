//! Errors raised while retrieving rows and building documents.

use query_engine_fetch::fetch;
use query_engine_translation::translation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The rows describe more than one root record.
    #[error("multiple root records ({count}) found in a response for a single target")]
    AmbiguousRoot { count: usize },
    #[error(transparent)]
    Translation(#[from] translation::error::Error),
    #[error("invalid fetch query: {0}")]
    Fetch(#[from] fetch::parse::Error),
    /// The executor failed to run a page of the query.
    #[error("fetch execution failed: {0}")]
    Execution(anyhow::Error),
}
