#![allow(clippy::unwrap_used)]
// Integration tests for `TwinClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ixtwin_api::{Error, ResourceEntryKind, TwinClient, UploadFile};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, TwinClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = TwinClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Lifecycle tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_get_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "running": true,
            "starting": false,
            "devices_count": 5,
            "error": null
        })))
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();

    assert!(status.running);
    assert!(!status.starting);
    assert_eq!(status.devices_count, Some(5));
    assert_eq!(status.error, None);
}

#[tokio::test]
async fn test_start_sends_max_devices() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/start"))
        .and(body_json(json!({ "max_devices": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "starting",
            "message": "Digital twin is starting"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.start(Some(5)).await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("Digital twin is starting"));
}

#[tokio::test]
async fn test_start_all_devices_sends_null() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/start"))
        .and(body_json(json!({ "max_devices": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "starting",
            "message": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.start(None).await.unwrap();
}

#[tokio::test]
async fn test_reload_sends_rs_only() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reload"))
        .and(body_json(json!({ "rs_only": true, "max_devices": null })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Route servers reloaded"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.reload(true, None).await.unwrap();
    assert_eq!(resp.message.as_deref(), Some("Route servers reloaded"));
}

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/stop"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Digital twin is not running"
        })))
        .mount(&server)
        .await;

    let err = client.stop().await.unwrap_err();

    match &err {
        Error::Api { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message, "Digital twin is not running");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
    assert_eq!(err.detail(), Some("Digital twin is not running"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_plain_text_error_has_preview() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.get_status().await.unwrap_err();
    assert!(
        matches!(&err, Error::Api { status: 502, message } if message.contains("Bad Gateway")),
        "unexpected error: {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.get_status().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
}

// ── Resource tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_list_resource_files() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/resources/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                { "name": "peering-lan", "type": "directory" },
                { "name": "rs1.dump", "type": "file" }
            ]
        })))
        .mount(&server)
        .await;

    let files = client.list_resource_files().await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "peering-lan");
    assert_eq!(files[0].kind, ResourceEntryKind::Directory);
    assert_eq!(files[1].kind, ResourceEntryKind::File);
}

#[tokio::test]
async fn test_upload_resource_file_is_multipart() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/resources/upload"))
        .and(body_string_contains("filename=\"rs1.dump\""))
        .and(body_string_contains("10.0.0.0/24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "filename": "rs1.dump",
            "message": "File rs1.dump uploaded successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .upload_resource_file(UploadFile::new("rs1.dump", "10.0.0.0/24 via 192.0.2.1\n"))
        .await
        .unwrap();
    assert_eq!(resp.filename.as_deref(), Some("rs1.dump"));
}

#[tokio::test]
async fn test_upload_directory_keeps_relative_paths() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/resources/upload-directory"))
        .and(body_string_contains("filename=\"dumps/a.dump\""))
        .and(body_string_contains("filename=\"dumps/nested/b.dump\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "directory": "dumps",
            "files_count": 2,
            "message": "Directory dumps uploaded successfully with 2 files"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .upload_resource_directory(vec![
            UploadFile::new("dumps/a.dump", "a"),
            UploadFile::new("dumps/nested/b.dump", "b"),
        ])
        .await
        .unwrap();
    assert_eq!(resp.files_count, Some(2));
}

// ── Machine tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_command_logical_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/machines/exec"))
        .and(body_json(json!({ "machine_name": "rs9", "command": "uptime" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "machine_name": "rs9",
            "command": "uptime",
            "error": "no such machine"
        })))
        .mount(&server)
        .await;

    let reply = client.execute_command("rs9", "uptime").await.unwrap();
    assert!(!reply.is_success());
    assert_eq!(reply.output, None);
    assert_eq!(reply.error.as_deref(), Some("no such machine"));
}

#[tokio::test]
async fn test_machine_stats() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/machines/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "machines": {
                "abc": { "name": "rs1", "status": "running", "image": "kathara/bird",
                         "cpu_usage": 1.5, "memory_usage": 32.0, "pids": 4 }
            }
        })))
        .mount(&server)
        .await;

    let stats = client.machine_stats().await.unwrap();
    let rs1 = stats.get("abc").unwrap();
    assert_eq!(rs1.name.as_deref(), Some("rs1"));
    assert_eq!(rs1.pids, Some(4));
}

// ── RIB tests ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_compare_rib() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rib/compare"))
        .and(body_json(json!({ "route_server": "rs1", "resource_file": "dump.txt" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "route_server": "rs1",
            "resource_file": "dump.txt",
            "live_rib_lines": 120,
            "uploaded_rib_lines": 119,
            "only_in_live": ["a", "b"],
            "only_in_uploaded": ["c"],
            "differences_count": 3,
            "message": "Found 3 differences"
        })))
        .mount(&server)
        .await;

    let result = client.compare_rib("rs1", "dump.txt").await.unwrap();

    assert_eq!(result.differences_count, 3);
    assert_eq!(result.only_in_live, vec!["a", "b"]);
    assert_eq!(result.only_in_uploaded, vec!["c"]);
    assert_eq!(result.live_rib_lines, 120);
}

#[tokio::test]
async fn test_ixp_config_passthrough() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config/ixp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "route_servers": { "rs1": { "type": "bird" } }
        })))
        .mount(&server)
        .await;

    let config = client.get_ixp_config().await.unwrap();
    assert_eq!(config["route_servers"]["rs1"]["type"], "bird");
}
