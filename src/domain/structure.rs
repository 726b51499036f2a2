// Domain-level identities for actors, structures, and their timers.

/// Opaque player identity supplied by the host.
pub type ActorId = u64;

/// Opaque handle to a placed structure.
pub type StructureId = u64;

/// Which one-shot timer a schedule/cancel call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Window during which the owner may demolish the structure.
    Demolish,
    /// Window during which the block may still be rotated.
    Rotation,
}
