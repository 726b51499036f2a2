pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use domain::tier::{
    DemolishProfile, HammerProfile, Namespace, PermissionId, TierName, TierTable, TimerProfile,
};
pub use frameworks::host::{PluginHost, PluginSettings};
pub use use_cases::resolver::TierResolver;
