use std::sync::Mutex;

use crate::capture::domain::camera_permission::{
    CameraPermission, PermissionCallback, PermissionStatus,
};

/// Camera permission through `nokhwa`'s platform initialisation.
///
/// On macOS this shows the AVFoundation consent prompt; other platforms
/// report access as granted immediately.
pub struct NokhwaCameraPermission;

impl CameraPermission for NokhwaCameraPermission {
    fn status(&self) -> PermissionStatus {
        if nokhwa::nokhwa_check() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::NotDetermined
        }
    }

    fn request(&self, on_result: PermissionCallback) {
        // nokhwa wants a `Fn`; the callback must still run at most once.
        let slot = Mutex::new(Some(on_result));
        nokhwa::nokhwa_initialize(move |granted| {
            let callback = slot.lock().unwrap_or_else(|e| e.into_inner()).take();
            if let Some(callback) = callback {
                callback(granted);
            }
        });
    }
}
