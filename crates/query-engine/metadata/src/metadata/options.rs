//! Options controlling which attributes end up in a message document.

use std::collections::BTreeSet;

use enum_iterator::Sequence;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single attribute option.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum AttributeOption {
    /// On updates, only the attributes present on the changed record go into the root
    /// of the document.
    ModifiedOnly,
    /// Add display text (`{attribute}name` / `{attribute}formatted`) next to raw values.
    Formatted,
}

impl AttributeOption {
    /// Bit used for this option in the legacy integer encoding.
    pub const fn flag(self) -> u32 {
        match self {
            AttributeOption::ModifiedOnly => 1,
            AttributeOption::Formatted => 2,
        }
    }
}

/// A set of attribute options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AttributeOptions(BTreeSet<AttributeOption>);

impl AttributeOptions {
    pub fn none() -> Self {
        AttributeOptions::default()
    }

    /// Decode the legacy integer encoding. Unknown bits are ignored.
    pub fn from_flags(flags: u32) -> Self {
        enum_iterator::all::<AttributeOption>()
            .filter(|option| flags & option.flag() != 0)
            .collect()
    }

    #[must_use]
    pub fn with(mut self, option: AttributeOption) -> Self {
        self.0.insert(option);
        self
    }

    pub fn contains(&self, option: AttributeOption) -> bool {
        self.0.contains(&option)
    }

    pub fn modified_only(&self) -> bool {
        self.contains(AttributeOption::ModifiedOnly)
    }

    pub fn include_formatted(&self) -> bool {
        self.contains(AttributeOption::Formatted)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AttributeOption> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<AttributeOption> for AttributeOptions {
    fn from_iter<T: IntoIterator<Item = AttributeOption>>(iter: T) -> Self {
        AttributeOptions(iter.into_iter().collect())
    }
}
