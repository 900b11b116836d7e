pub mod config;
pub mod constants;
pub mod display_surface;
pub mod frame;
pub mod resolution;
pub mod rotation;
