pub mod authorization;
pub mod config;
pub mod device;
pub mod diagnostics;
pub mod error;
pub mod interruption;
pub mod status;
