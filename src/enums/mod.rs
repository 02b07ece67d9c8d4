pub mod api_error;
pub mod commands;
pub mod resource_class;
pub mod scan_mode;
