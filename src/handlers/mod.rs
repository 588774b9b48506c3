pub mod devices;
pub mod status;
pub mod ws;
