//! Cross-task control state for a running discussion
//!
//! The pause flag and the human intervention queue sit behind one mutex and
//! are the only state control operations touch while a turn is in flight.
//! Stop is a separate cancellation token. Control operations never touch
//! the discussion itself; the turn loop reads this state at turn boundaries.

use roundtable_domain::HumanIntervention;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
struct ControlInner {
    pause_requested: bool,
    queue: VecDeque<HumanIntervention>,
}

#[derive(Debug, Default)]
pub struct ControlState {
    inner: Mutex<ControlInner>,
    wake: Notify,
    stop: CancellationToken,
}

impl ControlState {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, ControlInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Pause ====================

    pub fn request_pause(&self) {
        self.inner().pause_requested = true;
    }

    pub fn is_pause_requested(&self) -> bool {
        self.inner().pause_requested
    }

    /// Clear the pause flag and wake a waiting loop.
    ///
    /// Returns whether a pause was requested.
    pub fn clear_pause(&self) -> bool {
        let was_requested = std::mem::replace(&mut self.inner().pause_requested, false);
        self.wake.notify_one();
        was_requested
    }

    /// Wait until the pause flag is cleared or stop is requested.
    pub async fn wait_while_paused(&self) {
        while self.is_pause_requested() && !self.is_stop_requested() {
            tokio::select! {
                _ = self.wake.notified() => {}
                _ = self.stop.cancelled() => {}
            }
        }
    }

    // ==================== Interventions ====================

    pub fn enqueue(&self, intervention: HumanIntervention) {
        self.inner().queue.push_back(intervention);
    }

    /// Oldest pending intervention.
    pub fn dequeue(&self) -> Option<HumanIntervention> {
        self.inner().queue.pop_front()
    }

    pub fn pending_interventions(&self) -> usize {
        self.inner().queue.len()
    }

    // ==================== Stop ====================

    pub fn request_stop(&self) {
        self.stop.cancel();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.is_cancelled()
    }
}
