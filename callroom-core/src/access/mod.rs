pub mod authorization_gate;
pub mod device_catalog;
