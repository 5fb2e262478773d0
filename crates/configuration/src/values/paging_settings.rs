use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the rows of a fetch query are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagingSettings {
    /// number of rows requested per page
    #[serde(default = "page_size_default")]
    pub page_size: u32,
    /// pages retrieved before giving up on the remaining rows
    #[serde(default = "max_pages_default")]
    pub max_pages: u32,
}

impl PagingSettings {
    pub fn is_default(&self) -> bool {
        *self == PagingSettings::default()
    }
}

impl Default for PagingSettings {
    fn default() -> PagingSettings {
        PagingSettings {
            page_size: page_size_default(),
            max_pages: max_pages_default(),
        }
    }
}

fn page_size_default() -> u32 {
    5000
}

fn max_pages_default() -> u32 {
    10
}
