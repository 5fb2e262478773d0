//! Execute a prepared fetch query page by page.

use async_trait::async_trait;
use query_engine_fetch::fetch::{helpers::set_paging, parse, string};
use query_engine_metadata::metadata::RowSet;
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};

use crate::error::Error;
use crate::metrics;

/// One page of a fetch response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchPage {
    pub rows: RowSet,
    #[serde(default)]
    pub more_records: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_cookie: Option<String>,
}

/// Runs fetch query text against the platform.
#[async_trait]
pub trait FetchExecutor: Send + Sync {
    async fn retrieve_page(&self, fetch_query: &str) -> Result<FetchPage, anyhow::Error>;
}

/// Retrieve the rows of every page of `fetch_query`, up to `max_pages` pages.
///
/// Queries without a `<fetch>` element cannot be paged and are executed once.
pub async fn retrieve_all(
    executor: &dyn FetchExecutor,
    metrics: &metrics::Metrics,
    fetch_query: &str,
    page_size: u32,
    max_pages: u32,
) -> Result<RowSet, Error> {
    let mut document = parse::parse_document(fetch_query)?;
    let pageable = document.fetch_mut().is_some();

    let mut rows = vec![];
    let mut paging_cookie: Option<String> = None;
    for page in 1..=max_pages.max(1) {
        if pageable {
            set_paging(&mut document, page_size, page, paging_cookie.as_deref());
        }
        let query = string::render(&document);

        let response = executor
            .retrieve_page(&query)
            .instrument(info_span!("Retrieve page", page))
            .await
            .map_err(Error::Execution)?;
        metrics.fetch_pages_total.inc();

        tracing::debug!(
            page,
            rows = response.rows.len(),
            more_records = response.more_records,
            "retrieved page"
        );
        rows.extend(response.rows.0);

        if !pageable || !response.more_records {
            return Ok(RowSet(rows));
        }
        paging_cookie = response.paging_cookie;
    }

    tracing::warn!(
        max_pages,
        rows = rows.len(),
        "more records available after the last allowed page"
    );
    Ok(RowSet(rows))
}
