// Frameworks layer: persistence and runtime bootstrap.

pub mod config;
pub mod host;
