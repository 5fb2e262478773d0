//! Runtime configuration for the mapper.

use query_engine_metadata::metadata::AttributeOptions;
use uuid::Uuid;

use crate::values::PagingSettings;

/// The 'Configuration' type collects all the information necessary to map events at runtime.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration', which also checks the fetch template.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    /// `None` when documents are built straight from the event record.
    pub fetch_template: Option<String>,
    pub ignore_changes_from: Option<Uuid>,
    pub attribute_options: AttributeOptions,
    pub paging: PagingSettings,
}

impl Configuration {
    /// Whether events initiated by `user_id` should produce no message.
    pub fn ignores_changes_from(&self, user_id: Option<Uuid>) -> bool {
        matches!((self.ignore_changes_from, user_id), (Some(ignored), Some(user)) if ignored == user)
    }
}
