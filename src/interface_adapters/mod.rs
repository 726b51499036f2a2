// Interface adapters: concrete implementations of the domain ports.

pub mod oracle;
pub mod timers;

pub use oracle::InMemoryPermissionOracle;
pub use timers::TokioTimerScheduler;
