//! Errors returned when mapping an event.

use query_engine_execution::{error as execution, metrics};
use query_engine_metadata::metadata::UnsupportedEventMessage;
use query_engine_translation::translation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    UnsupportedEventMessage(#[from] UnsupportedEventMessage),
    #[error("invalid fetch query: {0}")]
    InvalidQuery(translation::error::Error),
    #[error("multiple root records ({count}) found in a response for a single target")]
    AmbiguousRoot { count: usize },
    #[error("fetch execution failed: {0}")]
    Execution(anyhow::Error),
}

impl Error {
    /// Log an execution failure and convert it, counting rejected responses.
    pub(crate) fn from_execution(err: execution::Error, metrics: &metrics::Metrics) -> Self {
        tracing::error!("{}", err);
        match err {
            execution::Error::AmbiguousRoot { count } => {
                metrics.ambiguous_root_total.inc();
                Error::AmbiguousRoot { count }
            }
            execution::Error::Translation(err) => Error::InvalidQuery(err),
            execution::Error::Fetch(err) => Error::InvalidQuery(err.into()),
            execution::Error::Execution(err) => Error::Execution(err),
        }
    }
}
