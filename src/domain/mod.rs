// Domain layer: tier/profile types and ports to the host engine.

pub mod ports;
pub mod structure;
pub mod tier;

pub use structure::{ActorId, StructureId, TimerKind};
pub use tier::{
    DemolishProfile, HammerProfile, Namespace, PermissionId, TierName, TierTable, TimerProfile,
};
