/// Current OS-level camera access state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    NotDetermined,
}

/// Result of the startup access flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted,
    /// Terminal for the session: the live preview stays disabled.
    Denied,
}

pub type PermissionCallback = Box<dyn FnOnce(bool) + Send>;

/// Platform camera permission.
pub trait CameraPermission: Send + Sync {
    fn status(&self) -> PermissionStatus;

    /// Shows the OS prompt. The callback may run on another thread.
    fn request(&self, on_result: PermissionCallback);
}

/// Runs the one-shot startup access flow.
///
/// Already-granted access starts immediately; otherwise the OS prompt is
/// shown once. There is no retry after a denial.
pub fn resolve_camera_access(
    permission: &dyn CameraPermission,
    on_outcome: Box<dyn FnOnce(AccessOutcome) + Send>,
) {
    match permission.status() {
        PermissionStatus::Granted => on_outcome(AccessOutcome::Granted),
        PermissionStatus::Denied => {
            log::warn!("Camera access was previously denied");
            on_outcome(AccessOutcome::Denied);
        }
        PermissionStatus::NotDetermined => {
            log::info!("Requesting camera access");
            permission.request(Box::new(move |granted| {
                if granted {
                    on_outcome(AccessOutcome::Granted);
                } else {
                    log::warn!("Camera access denied by user");
                    on_outcome(AccessOutcome::Denied);
                }
            }));
        }
    }
}
