// Tier tables and the duration profiles they map to.

use serde::{Deserialize, Serialize};

/// Rotation fallback applied when an actor matches no configured tier.
///
/// Deliberately a fixed constant (the historical default-tier value) while
/// the demolish fallback tracks the live engine default. The asymmetry is
/// inherited behavior, kept as-is.
pub const FALLBACK_ROTATION_SECONDS: u32 = 600;

/// A permission tier name, normalized to lowercase at construction.
///
/// Two spellings that differ only in case are the same tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TierName(String);

impl TierName {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TierName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercased plugin identity used as the permission prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A registered permission string, `<namespace>.<tier>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionId(String);

impl PermissionId {
    /// Derives the permission id for a tier under a namespace.
    pub fn derive(namespace: &Namespace, tier: &TierName) -> Self {
        Self(format!("{}.{}", namespace.as_str(), tier.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered mapping from tier name to duration profile.
///
/// Order is load-bearing: it is the precedence order for resolution
/// (first match wins), so the table is an explicit sequence of pairs
/// rather than a map.
#[derive(Debug, Clone)]
pub struct TierTable<P> {
    entries: Vec<(TierName, P)>,
}

impl<P> TierTable<P> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a tier, keeping the first entry when the (case-normalized)
    /// name is already present.
    pub fn insert(&mut self, tier: TierName, profile: P) {
        if self.entries.iter().any(|(name, _)| *name == tier) {
            return;
        }
        self.entries.push((tier, profile));
    }

    /// Entries in precedence order.
    pub fn iter(&self) -> impl Iterator<Item = &(TierName, P)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P> Default for TierTable<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> FromIterator<(TierName, P)> for TierTable<P> {
    fn from_iter<I: IntoIterator<Item = (TierName, P)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (tier, profile) in iter {
            table.insert(tier, profile);
        }
        table
    }
}

/// Duration record attached to a tier.
///
/// The two shapes mirror the two plugins: demolish-only and
/// demolish-plus-rotation. Callers only read durations and build the
/// built-in fallback; they never look inside a profile otherwise.
pub trait TimerProfile: Clone + Send + Sync + 'static {
    fn demolish_seconds(&self) -> u32;

    /// Rotation duration, if this shape carries one.
    fn rotation_seconds(&self) -> Option<u32>;

    /// Built-in record returned when an actor matches no tier. The
    /// demolish duration comes from the live engine default; the rotation
    /// duration (when the shape has one) is `FALLBACK_ROTATION_SECONDS`.
    fn fallback(engine_demolish_seconds: u32) -> Self;

    /// Built-in `{default, vip}` table used when configuration is
    /// absent, stale, or empty.
    fn default_table() -> TierTable<Self>;
}

/// Single-duration profile (demolish window only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemolishProfile {
    pub demolish_seconds: u32,
}

impl TimerProfile for DemolishProfile {
    fn demolish_seconds(&self) -> u32 {
        self.demolish_seconds
    }

    fn rotation_seconds(&self) -> Option<u32> {
        None
    }

    fn fallback(engine_demolish_seconds: u32) -> Self {
        Self {
            demolish_seconds: engine_demolish_seconds,
        }
    }

    fn default_table() -> TierTable<Self> {
        [
            (
                TierName::new("default"),
                Self {
                    demolish_seconds: 600,
                },
            ),
            (
                TierName::new("vip"),
                Self {
                    demolish_seconds: 1200,
                },
            ),
        ]
        .into_iter()
        .collect()
    }
}

/// Dual-duration profile (demolish and rotation windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HammerProfile {
    pub demolish_seconds: u32,
    pub rotation_seconds: u32,
}

impl TimerProfile for HammerProfile {
    fn demolish_seconds(&self) -> u32 {
        self.demolish_seconds
    }

    fn rotation_seconds(&self) -> Option<u32> {
        Some(self.rotation_seconds)
    }

    fn fallback(engine_demolish_seconds: u32) -> Self {
        Self {
            demolish_seconds: engine_demolish_seconds,
            rotation_seconds: FALLBACK_ROTATION_SECONDS,
        }
    }

    fn default_table() -> TierTable<Self> {
        [
            (
                TierName::new("default"),
                Self {
                    demolish_seconds: 600,
                    rotation_seconds: 600,
                },
            ),
            (
                TierName::new("vip"),
                Self {
                    demolish_seconds: 1200,
                    rotation_seconds: 1200,
                },
            ),
        ]
        .into_iter()
        .collect()
    }
}
