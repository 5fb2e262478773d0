//! Turn the rows returned by a fetch query into message documents.

pub mod error;
pub mod flatten;
pub mod metrics;
pub mod query;
pub mod record;
pub mod values;
