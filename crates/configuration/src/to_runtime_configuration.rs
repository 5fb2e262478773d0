//! Convert a parsed configuration into the one used at runtime.

use query_engine_metadata::metadata::{AttributeOptions, EventMessage};
use query_engine_translation::translation::{prepare, query};
use uuid::Uuid;

use crate::configuration::Configuration;
use crate::error::MakeRuntimeConfigurationError;
use crate::version1::{ParsedConfiguration, CURRENT_VERSION};

/// Check the parsed configuration and build the runtime configuration from it.
///
/// A fetch template is prepared for a placeholder record and its query shape is built, so
/// a template that could never be mapped is rejected here rather than on the first event.
/// A blank template counts as no template.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
) -> Result<Configuration, MakeRuntimeConfigurationError> {
    if parsed_config.version != CURRENT_VERSION {
        return Err(MakeRuntimeConfigurationError::UnsupportedVersion {
            version: parsed_config.version,
            expected: CURRENT_VERSION,
        });
    }

    let fetch_template = parsed_config
        .fetch_xml
        .filter(|template| !template.trim().is_empty());

    if let Some(template) = &fetch_template {
        let prepared = prepare::prepare_query(
            template,
            Uuid::nil(),
            EventMessage::Create,
            &AttributeOptions::none(),
            None,
        )?;
        let shape = query::parse_query_shape(&prepared.template)?;
        tracing::info!(
            table = %shape.table_name,
            links = shape.nodes().len() - 1,
            "fetch template checked"
        );
    }

    Ok(Configuration {
        fetch_template,
        ignore_changes_from: parsed_config.ignore_changes_from,
        attribute_options: parsed_config.attribute_options,
        paging: parsed_config.paging,
    })
}
