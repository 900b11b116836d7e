pub mod contour_detector;
pub mod detected_face;
pub mod detection_engine;
pub mod input_image;
