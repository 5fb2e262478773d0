//! Platform events that trigger a message.

use std::fmt;
use std::str::FromStr;

use enum_iterator::Sequence;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The message name of the platform event being mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventMessage {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported event message '{0}', expected create, update or delete")]
pub struct UnsupportedEventMessage(pub String);

impl FromStr for EventMessage {
    type Err = UnsupportedEventMessage;

    fn from_str(message: &str) -> Result<Self, Self::Err> {
        let normalized = message.trim();
        enum_iterator::all::<EventMessage>()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| UnsupportedEventMessage(message.to_string()))
    }
}

impl EventMessage {
    pub const fn as_str(self) -> &'static str {
        match self {
            EventMessage::Create => "create",
            EventMessage::Update => "update",
            EventMessage::Delete => "delete",
        }
    }
}

impl fmt::Display for EventMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
