//! Turn a fetch template into the query text to execute for one event.

use query_engine_fetch::fetch::helpers::{
    populate_primary_id_attributes, restrict_to_required, substitute_target_id,
    TARGET_ID_PLACEHOLDER,
};
use query_engine_fetch::fetch::{parse, string};
use query_engine_metadata::metadata::{AttributeOptions, EventMessage, Row};
use uuid::Uuid;

use super::error::Error;

/// Fail unless the template has a target id placeholder.
pub fn check_template(template: &str) -> Result<(), Error> {
    if template.contains(TARGET_ID_PLACEHOLDER) {
        Ok(())
    } else {
        Err(Error::MissingPlaceholder(TARGET_ID_PLACEHOLDER))
    }
}

/// A fetch template rewritten for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedQuery {
    /// The rewritten template, placeholder intact. Every event with the same message,
    /// options and changed attributes shares it, so it keys cached query shapes.
    pub template: String,
    /// The query text to execute.
    pub query: String,
}

/// Prepare `template` for the record `target_id`.
///
/// On updates with the modified-only option, and when the changed record is known, the
/// query keeps only required attributes plus the attributes of that record. Primary ids
/// are added afterwards so every node can still be grouped.
pub fn prepare_query(
    template: &str,
    target_id: Uuid,
    message: EventMessage,
    options: &AttributeOptions,
    reference: Option<&Row>,
) -> Result<PreparedQuery, Error> {
    check_template(template)?;

    let mut document = parse::parse_document(template)?;

    let restrict_to = reference.filter(|_| message == EventMessage::Update && options.modified_only());
    if let Some(reference) = restrict_to {
        tracing::debug!(
            attributes = reference.attributes.len(),
            "restricting fetch query to modified attributes"
        );
        restrict_to_required(&mut document, reference.attributes.keys().map(String::as_str));
    }

    populate_primary_id_attributes(&mut document);

    let template = string::render(&document);
    let query = substitute_target_id(&template, &target_id);
    Ok(PreparedQuery { template, query })
}
