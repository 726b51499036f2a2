// Event loop reacting to structure placement.

use crate::domain::ports::{EngineDefaults, PermissionOracle, TimerScheduler};
use crate::domain::tier::TimerProfile;
use crate::use_cases::resolver::TierResolver;
use crate::use_cases::types::{PluginEvent, StructureId, TimerKind};

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Notify};
use tracing::debug;

/// Consumes structure placement events and rearms the demolish/rotation
/// timers according to the builder's tier.
///
/// The resolver arrives through a watch channel so configuration reloads
/// swap in a fresh table atomically; an event already being handled keeps
/// the resolver it borrowed and never sees a half-updated table.
pub async fn plugin_task<P: TimerProfile>(
    mut events_rx: mpsc::Receiver<PluginEvent>,
    resolver_rx: watch::Receiver<Arc<TierResolver<P>>>,
    oracle: Arc<dyn PermissionOracle>,
    defaults: Arc<dyn EngineDefaults>,
    scheduler: Arc<dyn TimerScheduler>,
    shutdown: Arc<Notify>,
) {
    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                // Exit cleanly when the host unloads the plugin.
                break;
            }
            event = events_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                match event {
                    PluginEvent::StructureBuilt { actor, structure, rotatable } => {
                        let resolver = resolver_rx.borrow().clone();
                        let profile = resolver.resolve_for_actor(
                            oracle.as_ref(),
                            defaults.as_ref(),
                            actor,
                        );
                        apply_profile(scheduler.as_ref(), structure, rotatable, &profile);
                        debug!(
                            actor,
                            structure,
                            demolish_seconds = profile.demolish_seconds(),
                            rotation_seconds = profile.rotation_seconds(),
                            "structure timers armed"
                        );
                    }
                }
            }
        }
    }
}

/// Rearms the timers a freshly placed structure needs.
///
/// The demolish timer is always rearmed. The rotation timer is rearmed
/// only when the profile shape carries a rotation duration and the
/// structure supports rotation; plain stability entities never get one.
pub fn apply_profile<P: TimerProfile>(
    scheduler: &dyn TimerScheduler,
    structure: StructureId,
    rotatable: bool,
    profile: &P,
) {
    scheduler.cancel(structure, TimerKind::Demolish);
    scheduler.schedule(structure, TimerKind::Demolish, profile.demolish_seconds());

    if !rotatable {
        return;
    }
    if let Some(rotation_seconds) = profile.rotation_seconds() {
        scheduler.cancel(structure, TimerKind::Rotation);
        scheduler.schedule(structure, TimerKind::Rotation, rotation_seconds);
    }
}

/// Registers every derived permission with the oracle.
///
/// Called by the host before the event loop starts serving; registration
/// is idempotent, so re-running it after a reload only adds new ids.
pub fn register_permissions<P: TimerProfile>(
    resolver: &TierResolver<P>,
    oracle: &dyn PermissionOracle,
) {
    for id in resolver.permission_ids() {
        oracle.register_permission(id);
    }
}
