//! Map platform events to message documents.

pub mod error;
pub mod mapper;
pub mod state;

pub use error::Error;
pub use mapper::{map_event, EventContext};
pub use state::{create_state, InitializationError, State};
