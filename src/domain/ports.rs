use crate::domain::structure::{ActorId, StructureId, TimerKind};
use crate::domain::tier::PermissionId;

// Port for the host's permission system.
pub trait PermissionOracle: Send + Sync {
    /// Registers a permission id. Idempotent: registering an id that is
    /// already known must succeed silently.
    fn register_permission(&self, id: &PermissionId);

    /// Whether the actor holds the permission. Unknown ids report false,
    /// never an error.
    fn actor_has_permission(&self, actor: ActorId, id: &PermissionId) -> bool;
}

// Port for engine-wide defaults owned by the game, not this plugin.
pub trait EngineDefaults: Send + Sync {
    /// The engine's current default demolish window in seconds.
    fn demolish_seconds(&self) -> u32;
}

// Port for the structure callbacks fired when a timer expires.
pub trait StructureGateway: Send + Sync {
    fn stop_being_demolishable(&self, structure: StructureId);
    fn stop_being_rotatable(&self, structure: StructureId);
}

// Port for one-shot timer scheduling against a structure.
pub trait TimerScheduler: Send + Sync {
    /// Arms a one-shot timer, replacing any live timer for the same
    /// (structure, kind) pair.
    fn schedule(&self, structure: StructureId, kind: TimerKind, delay_seconds: u32);

    /// Disarms a timer. Cancelling an inactive schedule is a no-op.
    fn cancel(&self, structure: StructureId, kind: TimerKind);
}
