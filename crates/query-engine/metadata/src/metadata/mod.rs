//! Data shared by every phase: attributes, row values, documents and options.

pub mod attributes;
pub mod document;
pub mod event;
pub mod options;
pub mod values;

// re-export without modules
pub use attributes::*;
pub use document::*;
pub use event::*;
pub use options::*;
pub use values::*;
