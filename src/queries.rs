pub mod coolers;
pub mod processes;
pub mod sensors;
pub mod system_info;
