pub mod blazeface;
pub mod contour_engine_factory;
pub mod execution_provider;
pub mod face_mesh_topology;
pub mod math;
pub mod model_resolver;
pub mod onnx_contour_detector;
pub mod threaded_detection_engine;
