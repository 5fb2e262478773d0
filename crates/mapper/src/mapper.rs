//! Map one platform event to the message document describing its record.

use tracing::{info_span, Instrument};
use uuid::Uuid;

use message_mapper_configuration::Configuration;
use query_engine_execution::query::{self, FetchExecutor};
use query_engine_execution::{flatten, record};
use query_engine_metadata::metadata::{EventMessage, MessageDocument, Row};
use query_engine_translation::translation::prepare;

use crate::error::Error;
use crate::state::State;

/// What the platform tells us about an event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    /// `create`, `update` or `delete`, in any case.
    pub message_name: String,
    pub table_name: String,
    pub target_id: Uuid,
    pub initiating_user_id: Option<Uuid>,
    /// The changed record. Absent on deletes, and holds only the changed attributes on
    /// updates.
    pub target: Option<Row>,
}

/// Build the message document for `event`.
///
/// Returns `None` when the event is ignored or the fetch query returned no rows.
pub async fn map_event(
    configuration: &Configuration,
    state: &State,
    executor: &dyn FetchExecutor,
    event: &EventContext,
) -> Result<Option<MessageDocument>, Error> {
    let message: EventMessage = event.message_name.parse().map_err(|err| {
        tracing::error!("{}", err);
        Error::UnsupportedEventMessage(err)
    })?;

    if configuration.ignores_changes_from(event.initiating_user_id) {
        tracing::info!(
            user = ?event.initiating_user_id,
            %message,
            "ignoring event initiated by the configured user"
        );
        state.metrics.ignored_events_total.inc();
        return Ok(None);
    }

    let options = &configuration.attribute_options;

    let Some(template) = &configuration.fetch_template else {
        tracing::debug!(
            table = %event.table_name,
            "no fetch template configured, using the event record"
        );
        let document = match &event.target {
            Some(target) => record::document_from_record(target, options.include_formatted()),
            None => record::document_for_deleted(&event.table_name, event.target_id),
        };
        state.metrics.record_documents_total.inc();
        return Ok(Some(document));
    };

    let reference = event.target.as_ref().filter(|_| options.modified_only());

    // Build the query text for this record.
    let prepared = async {
        prepare::prepare_query(template, event.target_id, message, options, reference).map_err(
            |err| {
                tracing::error!("{}", err);
                Error::InvalidQuery(err)
            },
        )
    }
    .instrument(info_span!("Prepare fetch query"))
    .await?;

    // Execute the query.
    let rows = query::retrieve_all(
        executor,
        &state.metrics,
        &prepared.query,
        configuration.paging.page_size,
        configuration.paging.max_pages,
    )
    .instrument(info_span!("Retrieve rows", table = %event.table_name))
    .await
    .map_err(|err| Error::from_execution(err, &state.metrics))?;

    if rows.is_empty() {
        tracing::info!(target_id = %event.target_id, "no records returned from fetch query");
        state.metrics.empty_responses_total.inc();
        return Ok(None);
    }

    let shape = state
        .shapes
        .get_or_parse(&prepared.template)
        .await
        .map_err(|err| {
            tracing::error!("{}", err);
            Error::InvalidQuery(err)
        })?;

    let document = flatten::flatten(&shape, &rows, reference, options.include_formatted())
        .map_err(|err| Error::from_execution(err, &state.metrics))?;

    // assuming mapping succeeded, increment counter
    state.metrics.documents_total.inc();

    Ok(Some(document))
}
