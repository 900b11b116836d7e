mod delivery_loop;
pub mod in_flight_limiter;
pub mod nokhwa_camera_permission;
pub mod nokhwa_frame_source;
pub mod still_image_frame_source;
