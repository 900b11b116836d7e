pub mod camera_permission;
pub mod capture_settings;
pub mod captured_frame;
pub mod frame_analyzer;
pub mod frame_source;
pub mod preview_sink;
