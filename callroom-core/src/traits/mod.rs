pub mod capture_backend;
pub mod device_provider;
pub mod notification_source;
pub mod permission_provider;
pub mod status_sink;
pub mod ui_context;
