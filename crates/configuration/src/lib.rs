pub mod configuration;
pub mod error;
pub mod to_runtime_configuration;
pub mod values;
pub mod version1;

pub use configuration::Configuration;
pub use to_runtime_configuration::make_runtime_configuration;
pub use values::PagingSettings;
pub use version1::{parse_configuration, write_parsed_configuration, ParsedConfiguration};
