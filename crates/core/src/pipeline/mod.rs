pub mod face_analyzer;
pub mod live_preview_use_case;
pub mod pipeline_logger;
