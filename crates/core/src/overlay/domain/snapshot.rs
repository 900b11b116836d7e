use std::sync::{Arc, Mutex};

use crate::detection::domain::detected_face::DetectedFace;
use crate::overlay::domain::face_status::FaceStatus;
use crate::shared::resolution::Resolution;

/// The most recent detection result, published as one unit.
///
/// `faces` and `resolution` always come from the same completed detection,
/// so renderers never pair one frame's points with another frame's size.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetectionSnapshot {
    pub faces: Vec<DetectedFace>,
    pub resolution: Resolution,
    /// Capture index of the frame the faces came from. `None` before the
    /// first detection completes.
    pub frame_index: Option<usize>,
    pub status: FaceStatus,
}

impl DetectionSnapshot {
    pub fn new(faces: Vec<DetectedFace>, resolution: Resolution, frame_index: usize) -> Self {
        let status = FaceStatus::from_faces(&faces);
        Self {
            faces,
            resolution,
            frame_index: Some(frame_index),
            status,
        }
    }
}

struct Slot {
    snapshot: Arc<DetectionSnapshot>,
    generation: u64,
}

/// Single-slot, replace-on-write holder for the latest snapshot.
///
/// Writers come from detection worker threads, readers from the UI. A
/// reader gets an `Arc` to a complete snapshot and never blocks a writer
/// for longer than a pointer swap. The last write wins, even when it
/// carries an older frame than the one it replaces.
pub struct SnapshotMailbox {
    slot: Mutex<Slot>,
}

impl SnapshotMailbox {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                snapshot: Arc::new(DetectionSnapshot::default()),
                generation: 0,
            }),
        }
    }

    /// Replaces the current snapshot and returns the new generation.
    pub fn publish(&self, snapshot: impl Into<Arc<DetectionSnapshot>>) -> u64 {
        let snapshot = snapshot.into();
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.snapshot = snapshot;
        slot.generation += 1;
        slot.generation
    }

    pub fn latest(&self) -> Arc<DetectionSnapshot> {
        self.slot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot
            .clone()
    }

    /// Number of publishes so far. Lets pollers skip unchanged snapshots.
    pub fn generation(&self) -> u64 {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).generation
    }
}

impl Default for SnapshotMailbox {
    fn default() -> Self {
        Self::new()
    }
}
