//! Concrete adapter implementations for ports.

pub mod console_menu;
pub mod file_config_adapter;
