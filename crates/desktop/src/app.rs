use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use iced::futures::channel::oneshot;
use iced::widget::image::Handle;
use iced::widget::{column, container, pick_list, row, stack, text, Canvas, Image};
use iced::{ContentFit, Element, Length, Subscription, Task, Theme};

use facecontour_core::capture::domain::camera_permission::{
    resolve_camera_access, AccessOutcome,
};
use facecontour_core::capture::domain::capture_settings::CaptureSettings;
use facecontour_core::capture::domain::frame_source::CameraSelector;
use facecontour_core::capture::infrastructure::nokhwa_camera_permission::NokhwaCameraPermission;
use facecontour_core::capture::infrastructure::nokhwa_frame_source::{
    list_cameras, CameraDescriptor, NokhwaFrameSource,
};
use facecontour_core::detection::infrastructure::threaded_detection_engine::ThreadedDetectionEngine;
use facecontour_core::overlay::domain::overlay_renderer::OverlayRenderer;
use facecontour_core::overlay::domain::snapshot::{DetectionSnapshot, SnapshotMailbox};
use facecontour_core::pipeline::live_preview_use_case::LivePreviewUseCase;
use facecontour_core::pipeline::pipeline_logger::NullPipelineLogger;
use facecontour_core::shared::config::AppConfig;

use crate::theme;
use crate::widgets::contour_overlay::ContourOverlay;
use crate::workers::engine_loader::{self, EngineMessage};
use crate::workers::preview_frames::{PreviewImage, PreviewSlot};

const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(16);

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    AccessResolved(AccessOutcome),
    NoticeClosed,
    CameraSelected(CameraDescriptor),
    Tick,
    PollSystemTheme,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Pending,
    Granted,
    Denied,
}

enum EngineState {
    Loading { downloaded: u64, total: u64 },
    Ready(Arc<ThreadedDetectionEngine>),
    Failed(String),
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    config: AppConfig,
    access: Access,
    engine: EngineState,
    engine_rx: Option<Receiver<EngineMessage>>,
    cameras: Vec<CameraDescriptor>,
    selected_camera: Option<CameraDescriptor>,
    use_case: Option<LivePreviewUseCase>,
    mailbox: Arc<SnapshotMailbox>,
    snapshot: Arc<DetectionSnapshot>,
    seen_generation: u64,
    preview: PreviewSlot,
    frame: Option<PreviewFrame>,
    renderer: OverlayRenderer,
    camera_error: Option<String>,
    dark: bool,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let config = AppConfig::load();
        let engine_rx = engine_loader::spawn(config.clone());
        let mailbox = Arc::new(SnapshotMailbox::new());

        (
            Self {
                renderer: OverlayRenderer::from_config(&config),
                config,
                access: Access::Pending,
                engine: EngineState::Loading {
                    downloaded: 0,
                    total: 0,
                },
                engine_rx: Some(engine_rx),
                cameras: Vec::new(),
                selected_camera: None,
                use_case: None,
                snapshot: mailbox.latest(),
                mailbox,
                seen_generation: 0,
                preview: PreviewSlot::new(),
                frame: None,
                camera_error: None,
                dark: theme::system_is_dark(),
            },
            request_camera_access(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::AccessResolved(AccessOutcome::Granted) => {
                self.access = Access::Granted;
                match list_cameras() {
                    Ok(cameras) => {
                        self.selected_camera =
                            initial_camera(&cameras, self.config.camera_index);
                        self.cameras = cameras;
                        if self.selected_camera.is_none() {
                            self.camera_error = Some("No camera found".into());
                        }
                    }
                    Err(e) => {
                        log::error!("{e}");
                        self.camera_error = Some(e.to_string());
                    }
                }
                self.start_preview();
            }
            Message::AccessResolved(AccessOutcome::Denied) => {
                self.access = Access::Denied;
                return show_access_notice();
            }
            Message::NoticeClosed => {}
            Message::CameraSelected(camera) => {
                if self.selected_camera.as_ref() != Some(&camera) {
                    log::info!("Switching to camera {camera}");
                    self.selected_camera = Some(camera);
                    self.start_preview();
                }
            }
            Message::Tick => {
                self.poll_engine();
                if let Some(image) = self.preview.take() {
                    self.frame = Some(PreviewFrame::from(image));
                }
                let generation = self.mailbox.generation();
                if generation != self.seen_generation {
                    self.seen_generation = generation;
                    self.snapshot = self.mailbox.latest();
                }
            }
            Message::PollSystemTheme => {
                self.dark = theme::system_is_dark();
            }
        }
        Task::none()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let camera_picker = pick_list(
            self.cameras.as_slice(),
            self.selected_camera.clone(),
            Message::CameraSelected,
        )
        .placeholder("No camera")
        .text_size(13);

        let status_text = text(self.status_line()).size(15).style(move |current: &Theme| {
            let color = match self.status_kind() {
                StatusKind::Face => theme::status_color(current, self.snapshot.status),
                StatusKind::Problem => theme::warning_color(current),
            };
            text::Style { color: Some(color) }
        });

        let toolbar = row![camera_picker, status_text]
            .spacing(16)
            .align_y(iced::Alignment::Center)
            .padding([8, 12]);

        let preview: Element<'_, Message> = match self.frame {
            Some(ref frame) => stack![
                Image::new(frame.handle.clone())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .content_fit(ContentFit::Contain),
                Canvas::new(ContourOverlay::new(
                    self.snapshot.clone(),
                    self.renderer,
                    frame.width,
                    frame.height,
                ))
                .width(Length::Fill)
                .height(Length::Fill),
            ]
            .into(),
            None => container(text(self.placeholder_text()).size(14))
                .center(Length::Fill)
                .into(),
        };

        column![toolbar, preview].height(Length::Fill).into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.dark)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            iced::time::every(FRAME_POLL_INTERVAL).map(|_| Message::Tick),
            iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme),
        ])
    }

    /// Binds the selected camera once access, engine and camera are all
    /// available. Safe to call again: the use case unbinds before rebinding.
    fn start_preview(&mut self) {
        if self.access != Access::Granted {
            return;
        }
        let EngineState::Ready(ref engine) = self.engine else {
            return;
        };
        let Some(ref camera) = self.selected_camera else {
            return;
        };

        let settings = CaptureSettings::from_config(&self.config);
        let selector = CameraSelector::front(camera.index);
        let use_case = self.use_case.get_or_insert_with(|| {
            LivePreviewUseCase::new(
                Box::new(NokhwaFrameSource::new(settings.clone())),
                engine.clone(),
                self.mailbox.clone(),
                NullPipelineLogger::shared(),
                None,
            )
        });

        log::info!("Starting {}", LivePreviewUseCase::describe(&settings, selector));
        self.frame = None;
        match use_case.start(selector, self.preview.sink(selector.is_mirrored())) {
            Ok(()) => self.camera_error = None,
            Err(e) => {
                log::error!("Could not start camera {}: {e}", camera.index);
                self.camera_error = Some(e.to_string());
            }
        }
    }

    fn poll_engine(&mut self) {
        let Some(rx) = self.engine_rx.take() else {
            return;
        };
        let mut finished = false;
        for message in rx.try_iter() {
            match message {
                EngineMessage::DownloadProgress(downloaded, total) => {
                    self.engine = EngineState::Loading { downloaded, total };
                }
                EngineMessage::Ready(engine) => {
                    log::info!("Face contour engine ready");
                    self.engine = EngineState::Ready(engine);
                    finished = true;
                }
                EngineMessage::Error(e) => {
                    self.engine = EngineState::Failed(e);
                    finished = true;
                }
            }
        }
        if finished {
            self.start_preview();
        } else {
            self.engine_rx = Some(rx);
        }
    }

    fn status_kind(&self) -> StatusKind {
        let healthy = self.access != Access::Denied
            && self.camera_error.is_none()
            && !matches!(self.engine, EngineState::Failed(_));
        if healthy {
            StatusKind::Face
        } else {
            StatusKind::Problem
        }
    }

    fn status_line(&self) -> String {
        if self.access == Access::Denied {
            return "Camera access denied".into();
        }
        if let EngineState::Failed(ref e) = self.engine {
            return format!("Face detection unavailable: {e}");
        }
        if let Some(ref e) = self.camera_error {
            return e.clone();
        }
        match self.engine {
            EngineState::Loading { downloaded, total } => loading_text(downloaded, total),
            _ => self.snapshot.status.text().to_string(),
        }
    }

    fn placeholder_text(&self) -> &'static str {
        match self.access {
            Access::Pending => "Waiting for camera access...",
            Access::Denied => "Live preview is disabled",
            Access::Granted => "Starting camera...",
        }
    }
}

/// The frame on screen and its upright size.
struct PreviewFrame {
    handle: Handle,
    width: u32,
    height: u32,
}

impl From<PreviewImage> for PreviewFrame {
    fn from(image: PreviewImage) -> Self {
        Self {
            width: image.width,
            height: image.height,
            handle: Handle::from_rgba(image.width, image.height, image.rgba),
        }
    }
}

#[derive(Clone, Copy)]
enum StatusKind {
    Face,
    Problem,
}

/// Runs the one-shot permission flow and reports its outcome as a message.
fn request_camera_access() -> Task<Message> {
    let (tx, rx) = oneshot::channel();
    resolve_camera_access(
        &NokhwaCameraPermission,
        Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }),
    );
    Task::perform(
        async move { rx.await.unwrap_or(AccessOutcome::Denied) },
        Message::AccessResolved,
    )
}

fn show_access_notice() -> Task<Message> {
    Task::perform(
        async {
            rfd::AsyncMessageDialog::new()
                .set_level(rfd::MessageLevel::Warning)
                .set_title("Camera access denied")
                .set_description(
                    "Face Contour needs the camera for its live preview. \
                     Grant access in your system settings and restart the app.",
                )
                .set_buttons(rfd::MessageButtons::Ok)
                .show()
                .await
        },
        |_| Message::NoticeClosed,
    )
}

/// The configured camera if present, else the first one listed.
fn initial_camera(cameras: &[CameraDescriptor], index: u32) -> Option<CameraDescriptor> {
    cameras
        .iter()
        .find(|c| c.index == index)
        .or_else(|| cameras.first())
        .cloned()
}

fn loading_text(downloaded: u64, total: u64) -> String {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        format!("Downloading face mesh model... {pct}%")
    } else if downloaded > 0 {
        format!("Downloading face mesh model... {downloaded} bytes")
    } else {
        "Loading face contour models...".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(index: u32) -> CameraDescriptor {
        CameraDescriptor {
            index,
            name: format!("Camera {index}"),
        }
    }

    #[test]
    fn test_initial_camera_prefers_configured_index() {
        let cameras = vec![camera(0), camera(2)];
        assert_eq!(initial_camera(&cameras, 2), Some(camera(2)));
    }

    #[test]
    fn test_initial_camera_falls_back_to_first() {
        let cameras = vec![camera(1), camera(3)];
        assert_eq!(initial_camera(&cameras, 7), Some(camera(1)));
        assert_eq!(initial_camera(&[], 0), None);
    }

    #[test]
    fn test_loading_text() {
        assert_eq!(loading_text(0, 0), "Loading face contour models...");
        assert_eq!(loading_text(50, 200), "Downloading face mesh model... 25%");
        assert_eq!(loading_text(10, 0), "Downloading face mesh model... 10 bytes");
    }
}
