use std::sync::Arc;

use parking_lot::Mutex;

/// Snapshot of the active job's progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProgressState {
    pub percentage: f64,
    pub completed: bool,
}

/// Process-wide single-slot progress for the active transcode.
#[derive(Clone, Debug, Default)]
pub struct ProgressStore {
    inner: Arc<Mutex<ProgressState>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_progress(&self, percentage: f64) {
        let percentage = percentage.clamp(0.0, 100.0);
        let mut state = self.inner.lock();
        state.percentage = percentage;
        state.completed = percentage >= 100.0;
    }

    pub fn get_progress(&self) -> ProgressState {
        *self.inner.lock()
    }

    pub fn reset(&self) {
        *self.inner.lock() = ProgressState::default();
    }
}
