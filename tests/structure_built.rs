mod support;

use structure_timers::domain::ports::PermissionOracle;
use structure_timers::domain::tier::{HammerProfile, Namespace, PermissionId, TierName};
use structure_timers::interface_adapters::{InMemoryPermissionOracle, TokioTimerScheduler};
use structure_timers::use_cases::types::{PluginEvent, TimerKind};
use structure_timers::{PluginHost, PluginSettings};

use std::sync::Arc;
use std::time::Duration;
use support::{settle, RecordingGateway, StaticEngineDefaults};

const ENGINE_DEFAULT_DEMOLISH: u32 = 300;

struct Harness {
    host: PluginHost<HammerProfile>,
    oracle: Arc<InMemoryPermissionOracle>,
    gateway: Arc<RecordingGateway>,
    // Also keeps the on-disk config alive for the host's lifetime.
    config_dir: tempfile::TempDir,
}

fn start_hammer_host() -> Harness {
    let config_dir = tempfile::tempdir().expect("tempdir");
    let mut settings = PluginSettings::extended_hammer();
    settings.config_path = config_dir.path().join("extendedhammer.json");

    let oracle = Arc::new(InMemoryPermissionOracle::new());
    let gateway = Arc::new(RecordingGateway::default());
    let defaults = Arc::new(StaticEngineDefaults {
        demolish_seconds: ENGINE_DEFAULT_DEMOLISH,
    });
    let scheduler = Arc::new(TokioTimerScheduler::new(gateway.clone()));

    let host = PluginHost::start(settings, oracle.clone(), defaults, scheduler)
        .expect("host should start");

    Harness {
        host,
        oracle,
        gateway,
        config_dir,
    }
}

fn perm(tier: &str) -> PermissionId {
    PermissionId::derive(&Namespace::new("extendedhammer"), &TierName::new(tier))
}

async fn advance(seconds: u64) {
    tokio::time::advance(Duration::from_secs(seconds)).await;
    settle().await;
}

#[tokio::test(start_paused = true)]
async fn vip_builder_gets_extended_timers() {
    let harness = start_hammer_host();
    harness.oracle.grant(1, &perm("vip"));

    harness
        .host
        .events()
        .send(PluginEvent::StructureBuilt {
            actor: 1,
            structure: 42,
            rotatable: true,
        })
        .await
        .expect("event accepted");
    settle().await;

    // The default tier's 600s deadline passes without firing: the vip
    // profile (1200s) applied.
    advance(601).await;
    assert!(harness.gateway.fired().is_empty());

    advance(600).await;
    let fired = harness.gateway.fired();
    assert!(fired.contains(&(42, TimerKind::Demolish)));
    assert!(fired.contains(&(42, TimerKind::Rotation)));
}

#[tokio::test(start_paused = true)]
async fn unprivileged_builder_gets_fallback_timers() {
    let harness = start_hammer_host();

    harness
        .host
        .events()
        .send(PluginEvent::StructureBuilt {
            actor: 9,
            structure: 7,
            rotatable: true,
        })
        .await
        .expect("event accepted");
    settle().await;

    // Demolish fires at the engine default (300), before rotation (600).
    advance(u64::from(ENGINE_DEFAULT_DEMOLISH) + 1).await;
    assert_eq!(harness.gateway.fired(), [(7, TimerKind::Demolish)]);

    advance(300).await;
    assert_eq!(
        harness.gateway.fired(),
        [(7, TimerKind::Demolish), (7, TimerKind::Rotation)]
    );
}

#[tokio::test(start_paused = true)]
async fn non_rotatable_structure_gets_no_rotation_timer() {
    let harness = start_hammer_host();
    harness.oracle.grant(1, &perm("default"));

    harness
        .host
        .events()
        .send(PluginEvent::StructureBuilt {
            actor: 1,
            structure: 5,
            rotatable: false,
        })
        .await
        .expect("event accepted");
    settle().await;

    advance(2000).await;
    assert_eq!(harness.gateway.fired(), [(5, TimerKind::Demolish)]);
}

#[tokio::test(start_paused = true)]
async fn startup_registers_config_permissions() {
    let harness = start_hammer_host();

    // Grants only work for registered ids, so a successful grant+query
    // proves registration happened during startup.
    harness.oracle.grant(1, &perm("vip"));
    assert!(harness.oracle.actor_has_permission(1, &perm("vip")));
    assert!(!harness.oracle.actor_has_permission(1, &perm("legendary")));
}

#[tokio::test(start_paused = true)]
async fn reload_publishes_new_tiers_without_touching_stale_snapshots() {
    let harness = start_hammer_host();

    // Snapshot taken before the reload, as a long-running caller would.
    let stale = harness.host.resolver();
    assert_eq!(stale.permission_ids().len(), 2);

    let doc = serde_json::json!({
        "version": "2.0.0",
        "profiles": [
            { "tier": "legendary", "demolish_seconds": 3600, "rotation_seconds": 3600 },
            { "tier": "default", "demolish_seconds": 600, "rotation_seconds": 600 },
            { "tier": "vip", "demolish_seconds": 1200, "rotation_seconds": 1200 }
        ]
    });
    std::fs::write(
        harness.config_dir.path().join("extendedhammer.json"),
        doc.to_string(),
    )
    .expect("write config");

    harness.host.reload().expect("reload");

    let fresh = harness.host.resolver();
    let fresh_ids: Vec<&str> = fresh
        .permission_ids()
        .iter()
        .map(|id| id.as_str())
        .collect();
    assert_eq!(
        fresh_ids,
        [
            "extendedhammer.legendary",
            "extendedhammer.default",
            "extendedhammer.vip",
        ]
    );

    // The pre-swap snapshot still sees only the original tiers.
    assert_eq!(stale.permission_ids().len(), 2);

    // The new permission was registered with the oracle during reload.
    harness.oracle.grant(1, &perm("legendary"));
    assert!(harness.oracle.actor_has_permission(1, &perm("legendary")));
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_event_processing() {
    let harness = start_hammer_host();
    harness.host.shutdown();
    settle().await;

    let _ = harness
        .host
        .events()
        .send(PluginEvent::StructureBuilt {
            actor: 1,
            structure: 1,
            rotatable: true,
        })
        .await;

    advance(5000).await;
    assert!(harness.gateway.fired().is_empty());
}
