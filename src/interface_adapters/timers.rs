// One-shot structure timers backed by tokio tasks.

use crate::domain::ports::{StructureGateway, TimerScheduler};
use crate::use_cases::types::{StructureId, TimerKind};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::AbortHandle;
use tracing::trace;

type TimerKey = (StructureId, TimerKind);

/// Timer scheduler that arms one tokio task per live timer.
///
/// Scheduling replaces any live timer for the same key, and cancelling an
/// inactive key is a no-op, so callers can cancel-then-schedule blindly
/// the way the event loop does. Must be used from within a tokio runtime.
pub struct TokioTimerScheduler {
    gateway: Arc<dyn StructureGateway>,
    active: Arc<Mutex<HashMap<TimerKey, AbortHandle>>>,
}

impl TokioTimerScheduler {
    pub fn new(gateway: Arc<dyn StructureGateway>) -> Self {
        Self {
            gateway,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of currently armed timers.
    pub fn active_count(&self) -> usize {
        self.active.lock().expect("timer map poisoned").len()
    }

    fn fire(gateway: &dyn StructureGateway, structure: StructureId, kind: TimerKind) {
        match kind {
            TimerKind::Demolish => gateway.stop_being_demolishable(structure),
            TimerKind::Rotation => gateway.stop_being_rotatable(structure),
        }
    }
}

impl TimerScheduler for TokioTimerScheduler {
    fn schedule(&self, structure: StructureId, kind: TimerKind, delay_seconds: u32) {
        let key = (structure, kind);
        let gateway = Arc::clone(&self.gateway);
        let active = Arc::clone(&self.active);

        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(u64::from(delay_seconds))).await;
            // Drop the bookkeeping entry before firing so a callback that
            // re-schedules the same key does not race its own removal.
            active.lock().expect("timer map poisoned").remove(&key);
            Self::fire(gateway.as_ref(), structure, kind);
        });

        let mut guard = self.active.lock().expect("timer map poisoned");
        if let Some(previous) = guard.insert(key, task.abort_handle()) {
            previous.abort();
        }
        trace!(structure, ?kind, delay_seconds, "timer armed");
    }

    fn cancel(&self, structure: StructureId, kind: TimerKind) {
        let removed = self
            .active
            .lock()
            .expect("timer map poisoned")
            .remove(&(structure, kind));
        if let Some(handle) = removed {
            handle.abort();
            trace!(structure, ?kind, "timer cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingGateway {
        fired: StdMutex<Vec<(StructureId, TimerKind)>>,
    }

    impl RecordingGateway {
        fn fired(&self) -> Vec<(StructureId, TimerKind)> {
            self.fired.lock().expect("fired mutex poisoned").clone()
        }
    }

    impl StructureGateway for RecordingGateway {
        fn stop_being_demolishable(&self, structure: StructureId) {
            self.fired
                .lock()
                .expect("fired mutex poisoned")
                .push((structure, TimerKind::Demolish));
        }

        fn stop_being_rotatable(&self, structure: StructureId) {
            self.fired
                .lock()
                .expect("fired mutex poisoned")
                .push((structure, TimerKind::Rotation));
        }
    }

    // Let spawned timer tasks run after the mock clock moves.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_after_delay() {
        let gateway = Arc::new(RecordingGateway::default());
        let scheduler = TokioTimerScheduler::new(gateway.clone());

        scheduler.schedule(1, TimerKind::Demolish, 600);
        settle().await;
        assert!(gateway.fired().is_empty());

        tokio::time::advance(Duration::from_secs(601)).await;
        settle().await;

        assert_eq!(gateway.fired(), [(1, TimerKind::Demolish)]);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing_and_is_idempotent() {
        let gateway = Arc::new(RecordingGateway::default());
        let scheduler = TokioTimerScheduler::new(gateway.clone());

        scheduler.schedule(1, TimerKind::Rotation, 10);
        scheduler.cancel(1, TimerKind::Rotation);
        // Second cancel hits an inactive schedule.
        scheduler.cancel(1, TimerKind::Rotation);

        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;

        assert!(gateway.fired().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reschedule_replaces_pending_timer() {
        let gateway = Arc::new(RecordingGateway::default());
        let scheduler = TokioTimerScheduler::new(gateway.clone());

        scheduler.schedule(1, TimerKind::Demolish, 10);
        scheduler.schedule(1, TimerKind::Demolish, 600);

        // The first deadline passes without firing.
        tokio::time::advance(Duration::from_secs(11)).await;
        settle().await;
        assert!(gateway.fired().is_empty());

        tokio::time::advance(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(gateway.fired(), [(1, TimerKind::Demolish)]);
    }

    #[tokio::test(start_paused = true)]
    async fn timers_for_different_kinds_are_independent() {
        let gateway = Arc::new(RecordingGateway::default());
        let scheduler = TokioTimerScheduler::new(gateway.clone());

        scheduler.schedule(1, TimerKind::Demolish, 10);
        scheduler.schedule(1, TimerKind::Rotation, 20);
        scheduler.cancel(1, TimerKind::Demolish);

        tokio::time::advance(Duration::from_secs(30)).await;
        settle().await;

        assert_eq!(gateway.fired(), [(1, TimerKind::Rotation)]);
    }
}
