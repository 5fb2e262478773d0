mod paging_settings;

pub use paging_settings::PagingSettings;
