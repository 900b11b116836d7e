pub const FACE_DETECTION_MODEL_NAME: &str = "blazeface_short_range.onnx";
pub const FACE_MESH_MODEL_NAME: &str = "face_mesh_468.onnx";

/// Directory name used under the platform config/cache roots.
pub const APP_DIR_NAME: &str = "FaceContour";

pub const STATUS_FACE_DETECTED: &str = "face detected";
pub const STATUS_NO_FACE_DETECTED: &str = "no face detected";

pub const DEFAULT_CAMERA_INDEX: u32 = 0;
pub const DEFAULT_CAPTURE_WIDTH: u32 = 1280;
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 720;
pub const DEFAULT_CAPTURE_FPS: u32 = 30;

/// Frames handed to the analyzer but not yet released.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 1;

pub const DEFAULT_DETECTION_WORKERS: usize = 1;
pub const DEFAULT_DETECTION_QUEUE: usize = 4;

pub const OVERLAY_STROKE_WIDTH: f32 = 10.0;
/// Opaque green, RGBA.
pub const OVERLAY_STROKE_COLOR: [u8; 4] = [0x00, 0xff, 0x00, 0xff];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
