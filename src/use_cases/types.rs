// Use-case level inputs for the plugin event loop.

pub use crate::domain::structure::{ActorId, StructureId, TimerKind};

#[derive(Debug, Clone)]
pub enum PluginEvent {
    /// An actor finished placing a structure.
    StructureBuilt {
        actor: ActorId,
        structure: StructureId,
        /// True for building blocks that support rotation after placement.
        rotatable: bool,
    },
}
