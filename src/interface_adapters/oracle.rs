// In-memory permission oracle for hosts without their own backend.

use crate::domain::ports::PermissionOracle;
use crate::domain::tier::PermissionId;
use crate::use_cases::types::ActorId;

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

/// Lock-guarded permission registry keyed by actor.
///
/// Only registered permission ids can be granted; querying an id that
/// was never registered reports not-held rather than failing.
#[derive(Debug, Default)]
pub struct InMemoryPermissionOracle {
    registered: RwLock<HashSet<PermissionId>>,
    grants: RwLock<HashMap<ActorId, HashSet<PermissionId>>>,
}

impl InMemoryPermissionOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants a registered permission to an actor. Granting an
    /// unregistered id is ignored with a log line, matching how the game
    /// host treats unknown permission strings.
    pub fn grant(&self, actor: ActorId, id: &PermissionId) {
        let registered = self.registered.read().expect("registered lock poisoned");
        if !registered.contains(id) {
            debug!(%id, actor, "ignoring grant of unregistered permission");
            return;
        }
        drop(registered);

        self.grants
            .write()
            .expect("grants lock poisoned")
            .entry(actor)
            .or_default()
            .insert(id.clone());
    }

    /// Removes a grant. Revoking a permission the actor never held is a
    /// no-op.
    pub fn revoke(&self, actor: ActorId, id: &PermissionId) {
        if let Some(held) = self
            .grants
            .write()
            .expect("grants lock poisoned")
            .get_mut(&actor)
        {
            held.remove(id);
        }
    }
}

impl PermissionOracle for InMemoryPermissionOracle {
    fn register_permission(&self, id: &PermissionId) {
        let inserted = self
            .registered
            .write()
            .expect("registered lock poisoned")
            .insert(id.clone());
        if inserted {
            debug!(%id, "permission registered");
        }
    }

    fn actor_has_permission(&self, actor: ActorId, id: &PermissionId) -> bool {
        self.grants
            .read()
            .expect("grants lock poisoned")
            .get(&actor)
            .is_some_and(|held| held.contains(id))
    }
}
