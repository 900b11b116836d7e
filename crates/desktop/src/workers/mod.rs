pub mod engine_loader;
pub mod preview_frames;
