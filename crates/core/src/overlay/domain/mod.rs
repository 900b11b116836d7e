pub mod coordinate_mapper;
pub mod face_status;
pub mod overlay_renderer;
pub mod render_surface;
pub mod snapshot;
