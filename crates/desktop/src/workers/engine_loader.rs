use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use facecontour_core::detection::infrastructure::contour_engine_factory::{
    create_contour_engine, resolve_models,
};
use facecontour_core::detection::infrastructure::threaded_detection_engine::ThreadedDetectionEngine;
use facecontour_core::shared::config::AppConfig;

pub enum EngineMessage {
    DownloadProgress(u64, u64),
    Ready(Arc<ThreadedDetectionEngine>),
    Error(String),
}

/// Resolves the contour models and builds the detection engine in the
/// background. The receiver yields progress updates followed by exactly one
/// `Ready` or `Error`.
pub fn spawn(config: AppConfig) -> Receiver<EngineMessage> {
    let (tx, rx) = crossbeam_channel::unbounded::<EngineMessage>();

    thread::spawn(move || {
        let message = match load_engine(&config, &tx) {
            Ok(engine) => EngineMessage::Ready(Arc::new(engine)),
            Err(e) => {
                log::error!("Face contour engine unavailable: {e}");
                EngineMessage::Error(e.to_string())
            }
        };
        let _ = tx.send(message);
    });

    rx
}

fn load_engine(
    config: &AppConfig,
    tx: &Sender<EngineMessage>,
) -> Result<ThreadedDetectionEngine, Box<dyn std::error::Error>> {
    let tx_progress = tx.clone();
    let models = resolve_models(
        config,
        Some(Box::new(move |downloaded, total| {
            let _ = tx_progress.send(EngineMessage::DownloadProgress(downloaded, total));
        })),
    )?;
    create_contour_engine(config, &models)
}
