//! Mutation Watcher state machine. The session owns one and feeds it the
//! host's mutation batches; the extraction timer it holds is the same one
//! navigation arms, so there is never more than one pending extraction.

use std::time::Duration;

use tokio::time::Instant;

use super::debounce::Debouncer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Observing,
}

#[derive(Debug)]
pub struct MutationWatcher {
    state: WatchState,
    timer: Debouncer,
}

impl MutationWatcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: WatchState::Idle,
            timer: Debouncer::new(delay),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Idle → Observing. Returns false when already observing; the caller
    /// runs the immediate extraction only on a true transition.
    pub fn start(&mut self) -> bool {
        if self.state == WatchState::Observing {
            return false;
        }
        self.state = WatchState::Observing;
        true
    }

    /// Observing → Idle, dropping any pending fire. Idempotent.
    pub fn stop(&mut self) -> bool {
        self.timer.cancel();
        if self.state == WatchState::Idle {
            return false;
        }
        self.state = WatchState::Idle;
        true
    }

    /// Replaces the pending extraction timer with a fresh one. Mutation
    /// batches and job-page navigation both land here, so they share it.
    pub fn arm(&mut self, now: Instant) {
        if self.state == WatchState::Observing {
            self.timer.arm(now);
        }
    }

    pub fn cancel_pending(&mut self) {
        self.timer.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(500);

    #[test]
    fn test_start_and_stop_are_idempotent() {
        let mut watcher = MutationWatcher::new(DELAY);
        assert!(watcher.start());
        assert!(!watcher.start());
        assert_eq!(watcher.state(), WatchState::Observing);
        assert!(watcher.stop());
        assert!(!watcher.stop());
        assert_eq!(watcher.state(), WatchState::Idle);
    }

    #[test]
    fn test_burst_coalesces_into_one_deadline() {
        let start = Instant::now();
        let mut watcher = MutationWatcher::new(DELAY);
        watcher.start();
        for offset in [0, 100, 250, 400] {
            watcher.arm(start + Duration::from_millis(offset));
        }
        assert_eq!(watcher.deadline(), Some(start + Duration::from_millis(900)));
    }

    #[test]
    fn test_idle_watcher_ignores_mutations() {
        let mut watcher = MutationWatcher::new(DELAY);
        watcher.arm(Instant::now());
        assert_eq!(watcher.deadline(), None);
    }

    #[test]
    fn test_stop_cancels_pending_fire() {
        let mut watcher = MutationWatcher::new(DELAY);
        watcher.start();
        watcher.arm(Instant::now());
        assert!(watcher.deadline().is_some());
        watcher.stop();
        assert_eq!(watcher.deadline(), None);
    }
}
