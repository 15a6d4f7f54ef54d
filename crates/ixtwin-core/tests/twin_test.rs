#![allow(clippy::unwrap_used)]
// Twin context bootstrap and teardown.

mod common;

use common::{FakeGateway, backend_error, running, twin, twin_with};
use ixtwin_core::{CoreError, MachineStats, ResourceFile, ResourceKind};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test(start_paused = true)]
async fn connect_loads_everything_and_starts_polling() {
    let gateway = FakeGateway::default();
    gateway.status.set_fallback(running(12));
    gateway
        .list
        .set_fallback(vec![ResourceFile::new("rs1.dump", ResourceKind::File)]);
    gateway.ixp.set_fallback(json!({
        "route_servers": { "rs1": { "type": "bird" } }
    }));
    let twin = twin_with(gateway);

    let status = twin.connect().await.unwrap();
    assert_eq!(status, running(12));
    assert!(twin.poller().is_polling().await);
    assert!(twin.catalog().snapshot().contains("rs1.dump"));
    assert_eq!(twin.rib().state().route_servers.len(), 1);

    twin.shutdown().await;
    assert!(!twin.poller().is_polling().await);
}

#[tokio::test(start_paused = true)]
async fn connect_tolerates_listing_failures() {
    let twin = twin();
    twin.gateway().list.push_err(backend_error("Resources directory missing"));
    twin.gateway().ixp.push_err(backend_error("IXP config not found"));

    twin.connect().await.unwrap();
    assert_eq!(
        twin.catalog().state().error.as_deref(),
        Some("Resources directory missing")
    );
    assert!(twin.rib().state().config_missing);

    twin.shutdown().await;
}

#[tokio::test]
async fn shutdown_is_final() {
    let twin = twin();
    twin.session().open("rs1").unwrap();
    twin.shutdown().await;
    twin.shutdown().await;

    assert!(twin.is_shut_down());
    assert!(!twin.session().state().is_open());
    assert!(matches!(twin.connect().await, Err(CoreError::ShutDown)));
    assert!(matches!(
        twin.lifecycle().reload(false, None).await,
        Err(CoreError::ShutDown)
    ));
    assert_eq!(twin.gateway().reload.calls(), 0);
}

#[tokio::test]
async fn machine_stats_pass_through() {
    let twin = twin();
    twin.gateway().stats.set_fallback(vec![MachineStats {
        id: "3f2a".into(),
        name: "rs1".into(),
        status: "running".into(),
        image: "bird:2.0".into(),
        cpu_usage_pct: Some(1.5),
        memory_usage_mb: Some(42.0),
        pids: Some(3),
    }]);

    let stats = twin.machine_stats().await.unwrap();
    assert_eq!(stats.len(), 1);
    assert!(stats[0].is_running());
}
