use std::panic::{self, AssertUnwindSafe};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::detection::domain::contour_detector::ContourDetector;
use crate::detection::domain::detection_engine::{
    Completion, DetectionEngine, DetectionError, DetectionResult,
};
use crate::detection::domain::input_image::InputImage;

struct Job {
    image: InputImage,
    on_complete: Completion,
}

/// Runs contour detectors on a pool of worker threads.
///
/// Layout: `process → bounded queue → worker[i] (detector i) → completion`
///
/// `process` never blocks: a full queue completes the job immediately with
/// [`DetectionError::Busy`]. Each worker owns one detector. A panicking
/// detector fails only the job that triggered it.
pub struct ThreadedDetectionEngine {
    job_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadedDetectionEngine {
    /// Spawns one worker per detector.
    pub fn new(
        detectors: Vec<Box<dyn ContourDetector>>,
        queue_capacity: usize,
    ) -> Result<Self, DetectionError> {
        if detectors.is_empty() {
            return Err(DetectionError::NoWorkers);
        }

        let (job_tx, job_rx) = crossbeam_channel::bounded::<Job>(queue_capacity.max(1));
        let mut engine = Self {
            job_tx: Some(job_tx),
            workers: Vec::with_capacity(detectors.len()),
        };

        for (i, detector) in detectors.into_iter().enumerate() {
            // On failure `engine` drops here and joins the workers already started.
            let handle = spawn_worker(i, detector, job_rx.clone())?;
            engine.workers.push(handle);
        }

        log::debug!(
            "Detection engine started with {} worker(s)",
            engine.workers.len()
        );
        Ok(engine)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    fn shutdown(&mut self) {
        // Closing the queue lets workers drain pending jobs and exit.
        self.job_tx.take();
        let current = std::thread::current().id();
        for handle in self.workers.drain(..) {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                log::error!("Detection worker panicked during shutdown");
            }
        }
    }
}

impl DetectionEngine for ThreadedDetectionEngine {
    fn process(&self, image: InputImage, on_complete: Completion) {
        let Some(job_tx) = self.job_tx.as_ref() else {
            on_complete(Err(DetectionError::ShutDown));
            return;
        };

        match job_tx.try_send(Job { image, on_complete }) {
            Ok(()) => {}
            Err(TrySendError::Full(job)) => (job.on_complete)(Err(DetectionError::Busy)),
            Err(TrySendError::Disconnected(job)) => {
                (job.on_complete)(Err(DetectionError::ShutDown))
            }
        }
    }
}

impl Drop for ThreadedDetectionEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_worker(
    id: usize,
    mut detector: Box<dyn ContourDetector>,
    job_rx: Receiver<Job>,
) -> Result<JoinHandle<()>, DetectionError> {
    std::thread::Builder::new()
        .name(format!("detection-{id}"))
        .spawn(move || {
            for Job { image, on_complete } in job_rx {
                let result = run_detector(detector.as_mut(), &image);
                drop(image);
                if panic::catch_unwind(AssertUnwindSafe(move || on_complete(result))).is_err() {
                    log::error!("Detection completion callback panicked on worker {id}");
                }
            }
        })
        .map_err(|e| DetectionError::Spawn(e.to_string()))
}

fn run_detector(detector: &mut dyn ContourDetector, image: &InputImage) -> DetectionResult {
    match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(image))) {
        Ok(Ok(faces)) => Ok(faces),
        Ok(Err(e)) => Err(DetectionError::Engine(e.to_string())),
        Err(_) => Err(DetectionError::Engine("detector panicked".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detected_face::{BoundingBox, DetectedFace};
    use crate::shared::frame::Frame;
    use crate::shared::rotation::Rotation;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Sleeps `delays[frame index]` ms, then reports one face whose
    /// confidence carries the frame index.
    struct StubDetector {
        delays: Vec<u64>,
        fail_on: Option<usize>,
        panic_on: Option<usize>,
    }

    impl StubDetector {
        fn instant() -> Self {
            Self {
                delays: vec![],
                fail_on: None,
                panic_on: None,
            }
        }
    }

    impl ContourDetector for StubDetector {
        fn detect(
            &mut self,
            image: &InputImage,
        ) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
            let index = image.frame().index();
            if let Some(&ms) = self.delays.get(index) {
                std::thread::sleep(Duration::from_millis(ms));
            }
            if self.panic_on == Some(index) {
                panic!("stub detector panic");
            }
            if self.fail_on == Some(index) {
                return Err("stub failure".into());
            }
            Ok(vec![DetectedFace {
                bounding_box: BoundingBox::default(),
                contours: vec![],
                confidence: index as f32,
            }])
        }
    }

    fn image(index: usize) -> InputImage {
        InputImage::new(
            Arc::new(Frame::new(vec![0u8; 3], 1, 1, 3, index)),
            Rotation::Deg0,
        )
    }

    type Log = Arc<Mutex<Vec<(usize, Result<usize, String>)>>>;

    fn recorder(log: &Log, index: usize) -> Completion {
        let log = log.clone();
        Box::new(move |result| {
            let entry = result
                .map(|faces| faces.len())
                .map_err(|e| e.to_string());
            log.lock().unwrap().push((index, entry));
        })
    }

    fn wait_for(log: &Log, n: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while log.lock().unwrap().len() < n && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_requires_a_worker() {
        let result = ThreadedDetectionEngine::new(vec![], 4);
        assert!(matches!(result, Err(DetectionError::NoWorkers)));
    }

    #[test]
    fn test_single_worker_completes_in_order() {
        let engine =
            ThreadedDetectionEngine::new(vec![Box::new(StubDetector::instant())], 8).unwrap();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..4 {
            engine.process(image(i), recorder(&log, i));
        }
        wait_for(&log, 4);

        let order: Vec<usize> = log.lock().unwrap().iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_detector_error_is_reported_and_worker_continues() {
        let detector = StubDetector {
            fail_on: Some(1),
            ..StubDetector::instant()
        };
        let engine = ThreadedDetectionEngine::new(vec![Box::new(detector)], 8).unwrap();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            engine.process(image(i), recorder(&log, i));
        }
        wait_for(&log, 3);

        let log = log.lock().unwrap();
        assert_eq!(log[0].1, Ok(1));
        assert!(log[1].1.as_ref().unwrap_err().contains("stub failure"));
        assert_eq!(log[2].1, Ok(1));
    }

    #[test]
    fn test_detector_panic_fails_only_that_job() {
        let detector = StubDetector {
            panic_on: Some(0),
            ..StubDetector::instant()
        };
        let engine = ThreadedDetectionEngine::new(vec![Box::new(detector)], 8).unwrap();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        engine.process(image(0), recorder(&log, 0));
        engine.process(image(1), recorder(&log, 1));
        wait_for(&log, 2);

        let log = log.lock().unwrap();
        assert!(log[0].1.as_ref().unwrap_err().contains("panicked"));
        assert_eq!(log[1].1, Ok(1));
    }

    #[test]
    fn test_full_queue_completes_with_busy() {
        let detector = StubDetector {
            delays: vec![200, 0, 0, 0],
            ..StubDetector::instant()
        };
        let engine = ThreadedDetectionEngine::new(vec![Box::new(detector)], 1).unwrap();
        let log: Log = Arc::new(Mutex::new(Vec::new()));

        engine.process(image(0), recorder(&log, 0));
        // Let the worker pick up job 0 so the queue slot frees.
        std::thread::sleep(Duration::from_millis(50));
        engine.process(image(1), recorder(&log, 1));
        engine.process(image(2), recorder(&log, 2));
        wait_for(&log, 3);

        let log = log.lock().unwrap();
        let busy = log.iter().find(|(i, _)| *i == 2).unwrap();
        assert_eq!(busy.1, Err(DetectionError::Busy.to_string()));
    }

    #[test]
    fn test_two_workers_may_complete_out_of_order() {
        let make = || -> Box<dyn ContourDetector> {
            Box::new(StubDetector {
                delays: vec![150, 0],
                ..StubDetector::instant()
            })
        };
        let engine = ThreadedDetectionEngine::new(vec![make(), make()], 4).unwrap();
        assert_eq!(engine.worker_count(), 2);

        let log: Log = Arc::new(Mutex::new(Vec::new()));
        engine.process(image(0), recorder(&log, 0));
        engine.process(image(1), recorder(&log, 1));
        wait_for(&log, 2);

        let order: Vec<usize> = log.lock().unwrap().iter().map(|(i, _)| *i).collect();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_drop_drains_queued_jobs() {
        let detector = StubDetector {
            delays: vec![20, 20, 20],
            ..StubDetector::instant()
        };
        let engine = ThreadedDetectionEngine::new(vec![Box::new(detector)], 8).unwrap();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            engine.process(image(i), recorder(&log, i));
        }
        drop(engine);

        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_panicking_completion_does_not_kill_worker() {
        let engine =
            ThreadedDetectionEngine::new(vec![Box::new(StubDetector::instant())], 8).unwrap();
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        engine.process(image(0), Box::new(|_| panic!("callback panic")));
        engine.process(image(1), recorder(&log, 1));
        wait_for(&log, 1);

        assert_eq!(log.lock().unwrap()[0], (1, Ok(1)));
    }
}
