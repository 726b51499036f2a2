// File-backed, versioned tier configuration.

use crate::domain::tier::{Namespace, TierName, TierTable, TimerProfile};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};
use tracing::warn;

/// Capacity for inbound plugin events.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Directory for plugin config documents, `<namespace>.json` each.
pub fn config_dir() -> PathBuf {
    env::var("STRUCTURE_TIMERS_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

pub fn default_config_path(namespace: &Namespace) -> PathBuf {
    config_dir().join(format!("{}.json", namespace.as_str()))
}

/// Errors surfaced by config persistence. Read-side problems are
/// repaired, not reported; only writing the repaired document back can
/// fail.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config io error: {e}"),
            Self::Serialize(e) => write!(f, "config serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// On-disk document shape. Profiles are an explicit array so tier
// precedence survives the round trip byte-for-byte.
#[derive(Debug, Serialize, Deserialize)]
struct ConfigDocument<P> {
    version: String,
    profiles: Vec<ProfileEntry<P>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileEntry<P> {
    tier: String,
    #[serde(flatten)]
    profile: P,
}

/// Loads and saves one plugin's config document.
pub struct ConfigStore {
    path: PathBuf,
    running_version: String,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, running_version: &str) -> Self {
        Self {
            path: path.into(),
            running_version: running_version.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the tier table, repairing whatever it finds.
    ///
    /// Missing, unparsable, or stale-versioned documents are replaced
    /// wholesale by the built-in default (no field-level migration), and
    /// an empty or fully-invalid profile list falls back to the default
    /// table. The resulting document is saved back so the file always
    /// reflects what is running. The returned table is never empty.
    pub fn load<P>(&self) -> Result<TierTable<P>, ConfigError>
    where
        P: TimerProfile + Serialize + DeserializeOwned,
    {
        let mut document = self.read_document::<P>();

        if document.version.as_str() < self.running_version.as_str() {
            warn!(
                path = %self.path.display(),
                stored = %document.version,
                running = %self.running_version,
                "config version is stale, replacing with defaults"
            );
            document = self.default_document::<P>();
        }

        let mut table = build_table(document.profiles);
        if table.is_empty() {
            warn!(
                path = %self.path.display(),
                "config has no usable profiles, falling back to the default table"
            );
            table = P::default_table();
            document = self.default_document::<P>();
        } else {
            document = ConfigDocument {
                version: self.running_version.clone(),
                profiles: entries_from_table(&table),
            };
        }

        self.save(&document)?;
        Ok(table)
    }

    fn read_document<P>(&self) -> ConfigDocument<P>
    where
        P: TimerProfile + DeserializeOwned,
    {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "config document missing, writing defaults"
                );
                return self.default_document();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(document) => document,
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "config document unreadable, replacing with defaults"
                );
                self.default_document()
            }
        }
    }

    fn default_document<P: TimerProfile>(&self) -> ConfigDocument<P> {
        ConfigDocument {
            version: self.running_version.clone(),
            profiles: entries_from_table(&P::default_table()),
        }
    }

    fn save<P: Serialize>(&self, document: &ConfigDocument<P>) -> Result<(), ConfigError> {
        let pretty = serde_json::to_string_pretty(document).map_err(ConfigError::Serialize)?;
        fs::write(&self.path, pretty).map_err(ConfigError::Io)
    }
}

// Filters out profiles with non-positive durations; the table dedups
// case-insensitive tier names, first entry winning.
fn build_table<P: TimerProfile>(profiles: Vec<ProfileEntry<P>>) -> TierTable<P> {
    profiles
        .into_iter()
        .filter(|entry| {
            let valid = entry.profile.demolish_seconds() > 0
                && entry.profile.rotation_seconds() != Some(0);
            if !valid {
                warn!(tier = %entry.tier, "dropping profile with non-positive duration");
            }
            valid
        })
        .map(|entry| (TierName::new(&entry.tier), entry.profile))
        .collect()
}

fn entries_from_table<P: TimerProfile>(table: &TierTable<P>) -> Vec<ProfileEntry<P>> {
    table
        .iter()
        .map(|(tier, profile)| ProfileEntry {
            tier: tier.as_str().to_string(),
            profile: profile.clone(),
        })
        .collect()
}
