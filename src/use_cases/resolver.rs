// Tiered permission-to-profile resolution.

use crate::domain::ports::{EngineDefaults, PermissionOracle};
use crate::domain::tier::{Namespace, PermissionId, TierTable, TimerProfile};
use crate::use_cases::types::ActorId;

/// Resolves which duration profile applies to an actor.
///
/// Owns the ordered tier table and the permission ids derived from it.
/// Both are fixed at construction; configuration reload builds a fresh
/// resolver and swaps it in rather than mutating this one.
pub struct TierResolver<P> {
    namespace: Namespace,
    table: TierTable<P>,
    // One id per table entry, in table order.
    permission_ids: Vec<PermissionId>,
}

impl<P: TimerProfile> TierResolver<P> {
    /// Builds a resolver over a non-empty table, deriving the permission
    /// id for every tier up front.
    pub fn new(namespace: Namespace, table: TierTable<P>) -> Self {
        let permission_ids = table
            .iter()
            .map(|(tier, _)| PermissionId::derive(&namespace, tier))
            .collect();
        Self {
            namespace,
            table,
            permission_ids,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn table(&self) -> &TierTable<P> {
        &self.table
    }

    /// The derived permission ids, one per tier in table order.
    ///
    /// Table keys are unique case-insensitively, so the set is already
    /// deduplicated. Derivation is deterministic: calling this (or
    /// rebuilding the resolver) never yields a different set for the
    /// same table.
    pub fn permission_ids(&self) -> &[PermissionId] {
        &self.permission_ids
    }

    /// Returns the profile of the first tier, in table order, whose
    /// permission the actor holds.
    ///
    /// Precedence is the table's literal entry order, not any numeric
    /// rank. When no tier matches, returns the built-in fallback built
    /// from the engine's current default demolish window; no-match is a
    /// normal outcome, not an error.
    pub fn resolve<F>(&self, mut actor_holds: F, engine_demolish_seconds: u32) -> P
    where
        F: FnMut(&PermissionId) -> bool,
    {
        for ((_, profile), id) in self.table.iter().zip(&self.permission_ids) {
            if actor_holds(id) {
                return profile.clone();
            }
        }
        P::fallback(engine_demolish_seconds)
    }

    /// Convenience wrapper querying the oracle and engine defaults ports.
    pub fn resolve_for_actor(
        &self,
        oracle: &dyn PermissionOracle,
        defaults: &dyn EngineDefaults,
        actor: ActorId,
    ) -> P {
        self.resolve(
            |id| oracle.actor_has_permission(actor, id),
            defaults.demolish_seconds(),
        )
    }
}
