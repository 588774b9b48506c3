pub mod charts;
pub mod config;
pub mod coolers;
pub mod processes;
pub mod search;
pub mod sensors;
pub mod system_info;
