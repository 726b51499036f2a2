// Shared fakes and wiring helpers for integration tests.

use structure_timers::domain::ports::{EngineDefaults, StructureGateway};
use structure_timers::use_cases::types::{StructureId, TimerKind};

use std::sync::Mutex;

// Fixed engine default so fallback assertions are deterministic.
pub struct StaticEngineDefaults {
    pub demolish_seconds: u32,
}

impl EngineDefaults for StaticEngineDefaults {
    fn demolish_seconds(&self) -> u32 {
        self.demolish_seconds
    }
}

// Records expiry callbacks so tests can observe when timers fire.
#[derive(Default)]
pub struct RecordingGateway {
    fired: Mutex<Vec<(StructureId, TimerKind)>>,
}

impl RecordingGateway {
    pub fn fired(&self) -> Vec<(StructureId, TimerKind)> {
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

// Let the spawned plugin and timer tasks run between assertions.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
