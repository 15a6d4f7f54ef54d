#![allow(clippy::unwrap_used)]
// RibComparisonWorkflow selection, mutual exclusion, and live download.

mod common;

use chrono::{NaiveDate, Utc};
use common::{FakeGateway, backend_error, settle, twin};
use ixtwin_core::{
    CommandReply, ComparisonResult, CoreError, RibActivity, RouteServer, RouteServerKind, Twin,
};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn twin_with_route_servers() -> Twin<FakeGateway> {
    let twin = twin();
    twin.gateway().ixp.set_fallback(json!({
        "ixp_name": "lab-ix",
        "route_servers": {
            "rs1": { "type": "bird", "ip": "10.0.0.1" },
            "rs2": { "type": "openbgpd", "ip": "10.0.0.2" }
        }
    }));
    twin.rib().load_route_servers().await.unwrap();
    twin
}

fn comparison(differences: u64) -> ComparisonResult {
    ComparisonResult {
        live_rib_lines: 120,
        uploaded_rib_lines: 118,
        differences_count: differences,
        only_in_live: vec!["a".into(), "b".into()],
        only_in_uploaded: vec!["c".into()],
        message: format!("{differences} differences found"),
    }
}

#[tokio::test]
async fn route_servers_come_from_topology_config() {
    let twin = twin_with_route_servers().await;
    let state = twin.rib().state();

    assert!(!state.config_missing);
    assert_eq!(
        *state.route_servers,
        vec![
            RouteServer {
                name: "rs1".into(),
                kind: RouteServerKind::Bird
            },
            RouteServer {
                name: "rs2".into(),
                kind: RouteServerKind::OpenBgpd
            },
        ]
    );
}

#[tokio::test]
async fn empty_topology_marks_config_missing() {
    let twin = twin();
    let servers = twin.rib().load_route_servers().await.unwrap();
    assert!(servers.is_empty());
    assert!(twin.rib().state().config_missing);

    twin.gateway().ixp.push_err(backend_error("IXP config not found"));
    assert!(twin.rib().load_route_servers().await.is_err());
    let state = twin.rib().state();
    assert!(state.config_missing);
    assert_eq!(state.error.as_deref(), Some("IXP config not found"));
}

#[tokio::test]
async fn compare_scenario_stores_result_verbatim() {
    let twin = twin_with_route_servers().await;
    twin.gateway().compare.push_ok(comparison(3));
    twin.rib().select_target("rs1").unwrap();
    twin.rib().select_file("dump.txt").unwrap();

    let result = twin.rib().compare().await.unwrap();
    assert_eq!(result.differences_count, 3);
    assert_eq!(twin.gateway().compare.args(), ["rs1 dump.txt"]);

    let state = twin.rib().state();
    let stored = state.result.unwrap();
    assert_eq!(stored.differences_count, 3);
    assert_eq!(stored.only_in_live, ["a", "b"]);
    assert_eq!(stored.only_in_uploaded, ["c"]);
    assert_eq!(state.activity, RibActivity::Idle);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn compare_without_file_never_calls_gateway() {
    let twin = twin_with_route_servers().await;
    twin.rib().select_target("rs1").unwrap();
    twin.rib().select_file("").unwrap();

    let err = twin.rib().compare().await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert_eq!(twin.gateway().compare.calls(), 0);
    assert_eq!(
        twin.rib().state().error.as_deref(),
        Some("Please select both a route server and a resource file")
    );
}

#[tokio::test]
async fn failed_compare_keeps_prior_result_and_selection() {
    let twin = twin_with_route_servers().await;
    let gateway = twin.gateway();
    gateway.compare.push_ok(comparison(0));
    gateway.compare.push_err(backend_error("Resource file not found"));
    twin.rib().select_target("rs2").unwrap();
    twin.rib().select_file("rs2.dump").unwrap();

    twin.rib().compare().await.unwrap();
    assert!(twin.rib().compare().await.is_err());

    let state = twin.rib().state();
    assert!(state.result.unwrap().is_match());
    assert_eq!(state.error.as_deref(), Some("Resource file not found"));
    assert_eq!(state.target.as_deref(), Some("rs2"));
    assert_eq!(state.file.as_deref(), Some("rs2.dump"));
}

#[tokio::test]
async fn compare_and_download_exclude_each_other() {
    let twin = twin_with_route_servers().await;
    let gateway = twin.gateway();
    twin.rib().select_target("rs1").unwrap();
    twin.rib().select_file("rs1.dump").unwrap();

    gateway.compare.hold();
    let comparing = tokio::spawn({
        let twin = twin.clone();
        async move { twin.rib().compare().await }
    });
    settle().await;
    assert_eq!(twin.rib().state().activity, RibActivity::Comparing);

    assert!(matches!(
        twin.rib().download_live_rib().await,
        Err(CoreError::Busy { .. })
    ));
    assert!(twin.rib().select_target("rs2").is_err());
    assert_eq!(gateway.exec.calls(), 0);

    gateway.compare.release_all();
    comparing.await.unwrap().unwrap();

    gateway.exec.hold();
    let downloading = tokio::spawn({
        let twin = twin.clone();
        async move { twin.rib().download_live_rib().await }
    });
    settle().await;
    assert_eq!(twin.rib().state().activity, RibActivity::DownloadingLive);

    assert!(matches!(
        twin.rib().compare().await,
        Err(CoreError::Busy { .. })
    ));
    assert_eq!(gateway.compare.calls(), 1);

    gateway.exec.release_all();
    downloading.await.unwrap().unwrap();
    assert_eq!(twin.rib().state().activity, RibActivity::Idle);
}

#[tokio::test]
async fn live_download_uses_daemon_command_and_dated_name() {
    let twin = twin_with_route_servers().await;
    let gateway = twin.gateway();
    gateway.exec.push_ok(CommandReply::Success {
        output: "BIRD 2.0.12 ready.\n10.0.0.0/8 via 10.0.0.5".into(),
    });
    gateway.exec.push_ok(CommandReply::Success {
        output: "flags prefix".into(),
    });

    twin.rib().select_target("rs1").unwrap();
    let before = Utc::now().date_naive();
    let dump = twin.rib().download_live_rib().await.unwrap();
    let after = Utc::now().date_naive();

    assert!(dump.contents.starts_with("BIRD"));
    let date = dump
        .file_name
        .strip_prefix("rs1-rib-")
        .and_then(|rest| rest.strip_suffix(".dump"))
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .unwrap();
    assert!(date == before || date == after);

    twin.rib().select_target("rs2").unwrap();
    twin.rib().download_live_rib().await.unwrap();

    assert_eq!(
        gateway.exec.args(),
        ["rs1: birdc show route all", "rs2: bgpctl show rib"]
    );
}

#[tokio::test]
async fn live_download_leaves_comparison_untouched() {
    let twin = twin_with_route_servers().await;
    twin.gateway().compare.push_ok(comparison(3));
    twin.rib().select_target("rs1").unwrap();
    twin.rib().select_file("rs1.dump").unwrap();
    twin.rib().compare().await.unwrap();
    twin.rib().toggle_details();

    twin.rib().download_live_rib().await.unwrap();

    let state = twin.rib().state();
    assert_eq!(state.result.unwrap().differences_count, 3);
    assert!(state.show_details);
}

#[tokio::test]
async fn live_download_requires_known_route_server() {
    let twin = twin_with_route_servers().await;

    let err = twin.rib().download_live_rib().await.unwrap_err();
    assert!(err.is_rejected_locally());
    assert_eq!(
        twin.rib().state().error.as_deref(),
        Some("Please select a route server")
    );

    twin.rib().select_target("rs9").unwrap();
    assert!(twin.rib().download_live_rib().await.is_err());
    assert_eq!(
        twin.rib().state().error.as_deref(),
        Some("Route server not found")
    );
    assert_eq!(twin.gateway().exec.calls(), 0);
    assert_eq!(twin.rib().state().activity, RibActivity::Idle);
}

#[tokio::test]
async fn live_download_command_failure_is_an_error() {
    let twin = twin_with_route_servers().await;
    twin.gateway().exec.push_ok(CommandReply::Failure {
        error: Some("birdc: cannot connect to control socket".into()),
    });
    twin.rib().select_target("rs1").unwrap();

    let err = twin.rib().download_live_rib().await.unwrap_err();
    assert!(matches!(err, CoreError::CommandFailed { .. }));
    assert_eq!(
        twin.rib().state().error.as_deref(),
        Some("birdc: cannot connect to control socket")
    );
}

#[tokio::test]
async fn new_comparison_collapses_details() {
    let twin = twin_with_route_servers().await;
    twin.rib().select_target("rs1").unwrap();
    twin.rib().select_file("rs1.dump").unwrap();

    twin.rib().compare().await.unwrap();
    assert!(twin.rib().toggle_details());
    twin.rib().compare().await.unwrap();
    assert!(!twin.rib().state().show_details);

    twin.rib().dismiss_error();
    assert_eq!(twin.rib().state().error, None);
}
