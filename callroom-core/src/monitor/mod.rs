pub mod interruption_monitor;
