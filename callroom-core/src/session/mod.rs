pub mod capture_session;
pub mod orchestrator;
pub mod ui_thread;
pub mod worker;
