// Use cases layer: resolution and the plugin event loop.

pub mod plugin;
pub mod resolver;
pub mod types;

pub use resolver::TierResolver;
pub use types::{ActorId, PluginEvent, StructureId, TimerKind};
