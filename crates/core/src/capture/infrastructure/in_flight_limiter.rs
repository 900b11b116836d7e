use crossbeam_channel::{Receiver, Sender};

use crate::capture::domain::captured_frame::ReleaseFn;

/// Caps the number of frames lent to an analyzer at once.
///
/// Permits live in a bounded channel. Acquiring one takes a token out;
/// the returned release function puts it back. A frame that is never
/// released permanently removes a permit, so a leak shows up as a stalled
/// analyzer rather than unbounded memory growth.
#[derive(Clone)]
pub struct InFlightLimiter {
    permits_tx: Sender<()>,
    permits_rx: Receiver<()>,
}

impl InFlightLimiter {
    pub fn new(max_in_flight: usize) -> Self {
        let capacity = max_in_flight.max(1);
        let (permits_tx, permits_rx) = crossbeam_channel::bounded(capacity);
        for _ in 0..capacity {
            let _ = permits_tx.try_send(());
        }
        Self {
            permits_tx,
            permits_rx,
        }
    }

    /// Takes a permit without blocking. `None` means every slot is on loan.
    pub fn try_acquire(&self) -> Option<ReleaseFn> {
        self.permits_rx.try_recv().ok()?;
        let tx = self.permits_tx.clone();
        Some(Box::new(move || {
            let _ = tx.try_send(());
        }))
    }

    pub fn available(&self) -> usize {
        self.permits_rx.len()
    }
}
