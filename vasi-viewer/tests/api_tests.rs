//! Integration tests for vasi-viewer API endpoints
//!
//! Tests cover:
//! - Health and build info endpoints
//! - Platform list order and load state
//! - Table filtering and drop-down values
//! - Table placeholders before and after loading
//! - Notes content and status captions
//! - Unknown platform handling
//! - Reload acknowledgement and event stream

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method
use vasi_common::fetch::MemoryFetcher;
use vasi_common::workbook::{Sheet, WorkbookError, WorkbookParser};
use vasi_common::{Platform, PlatformStore, ResourceCatalog, ResourceKind, ResourceLoader};
use vasi_viewer::{build_router, AppState};

/// Parses `a,b,c` lines as a single sheet so fixtures stay readable
struct TextTableParser;

impl WorkbookParser for TextTableParser {
    fn first_sheet(&self, bytes: &[u8]) -> Result<Option<Sheet>, WorkbookError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| WorkbookError::Unreadable(e.to_string()))?;
        Ok(Some(Sheet {
            name: "Sheet1".to_string(),
            rows: text
                .lines()
                .map(|line| line.split(',').map(str::to_string).collect())
                .collect(),
        }))
    }
}

const AWS_TABLE: &str = "Product,Release,Configuration,vCPU\n\
MiVB,10.0,Small,2\n\
MiVB,10.1,Large,8\n\
MiCollab,10.0,Small,4\n";

fn locator(platform: Platform, kind: ResourceKind) -> String {
    ResourceCatalog::new("").locator(platform, kind).to_string()
}

/// Test helper: loader over an in-memory resource set
fn setup_loader() -> Arc<ResourceLoader> {
    let fetcher = MemoryFetcher::new()
        .with_body(&locator(Platform::Aws, ResourceKind::Dataset), AWS_TABLE)
        .with_body(
            &locator(Platform::Aws, ResourceKind::Note),
            "Line one\\nLine two",
        )
        .with_failure(&locator(Platform::Azure, ResourceKind::Note), "connection reset");

    Arc::new(ResourceLoader::new(
        ResourceCatalog::new(""),
        Arc::new(fetcher),
        Arc::new(TextTableParser),
        Arc::new(PlatformStore::new()),
    ))
}

/// Test helper: app with every resource already settled
async fn setup_loaded_app() -> axum::Router {
    let loader = setup_loader();
    loader.load_everything().await;
    build_router(AppState::new(loader))
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app.oneshot(test_request("GET", uri)).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_answers_before_loading() {
    let app = build_router(AppState::new(setup_loader()));

    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "vasi-viewer");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = build_router(AppState::new(setup_loader()));

    let (status, body) = get_json(app, "/api/buildinfo").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Platform list
// =============================================================================

#[tokio::test]
async fn test_platform_list_in_tab_order() {
    let app = setup_loaded_app().await;

    let (status, body) = get_json(app, "/api/platforms").await;
    assert_eq!(status, StatusCode::OK);

    let labels: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["label"].as_str().unwrap())
        .collect();
    assert_eq!(
        labels,
        ["VMware", "Hyper-V", "Nutanix AHV", "Nutanix ESXi", "AWS", "Azure", "Proxmox"]
    );

    let aws = &body[4];
    assert_eq!(aws["id"], "aws");
    assert_eq!(aws["row_count"], 3);
    assert_eq!(aws["dataset_pending"], false);
    assert_eq!(aws["note_status"], "loaded");

    let azure = &body[5];
    assert_eq!(azure["row_count"], 0);
    assert_eq!(azure["note_status"], "error");

    assert_eq!(body[0]["note_status"], "missing");
}

// =============================================================================
// Table
// =============================================================================

#[tokio::test]
async fn test_table_unfiltered_lists_all_rows_and_options() {
    let app = setup_loaded_app().await;

    let (status, body) = get_json(app, "/api/platforms/aws/table").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["label"], "AWS");
    assert_eq!(body["columns"][3], "vCPU");
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["filtered_rows"], 3);
    assert!(body["placeholder"].is_null());

    let filters = body["filters"].as_array().unwrap();
    assert_eq!(filters.len(), 3);
    assert_eq!(filters[0]["column"], "Product");
    assert_eq!(filters[0]["selected"], "");
    assert_eq!(filters[0]["values"], serde_json::json!(["MiVB", "MiCollab"]));
    assert_eq!(filters[1]["values"], serde_json::json!(["10.0", "10.1"]));
}

#[tokio::test]
async fn test_table_filters_combine() {
    let app = setup_loaded_app().await;

    let (_, body) = get_json(app, "/api/platforms/aws/table?Product=MiVB&Configuration=Large").await;

    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["filtered_rows"], 1);
    assert_eq!(body["rows"][0], serde_json::json!(["MiVB", "10.1", "Large", "8"]));
    assert_eq!(body["filters"][0]["selected"], "MiVB");
    // Options still come from the whole dataset
    assert_eq!(body["filters"][0]["values"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_table_empty_filter_means_all() {
    let app = setup_loaded_app().await;

    let (_, body) = get_json(app, "/api/platforms/aws/table?Product=&Release=10.0").await;

    assert_eq!(body["filtered_rows"], 2);
}

#[tokio::test]
async fn test_table_filter_without_matches_keeps_columns() {
    let app = setup_loaded_app().await;

    let (_, body) = get_json(app, "/api/platforms/aws/table?Product=Nothing").await;

    assert_eq!(body["filtered_rows"], 0);
    assert_eq!(body["columns"].as_array().unwrap().len(), 4);
    assert!(body["placeholder"].is_null());
}

#[tokio::test]
async fn test_table_placeholder_while_loading() {
    let app = build_router(AppState::new(setup_loader()));

    let (_, body) = get_json(app, "/api/platforms/aws/table").await;

    assert_eq!(body["total_rows"], 0);
    assert_eq!(body["placeholder"], "Loading data...");
}

#[tokio::test]
async fn test_table_placeholder_when_no_data() {
    let app = setup_loaded_app().await;

    let (_, body) = get_json(app, "/api/platforms/hyper-v/table").await;

    assert_eq!(body["placeholder"], "No data available for Hyper-V");
    assert!(body["columns"].as_array().unwrap().is_empty());
}

// =============================================================================
// Notes
// =============================================================================

#[tokio::test]
async fn test_notes_loaded_with_line_breaks() {
    let app = setup_loaded_app().await;

    let (status, body) = get_json(app, "/api/platforms/aws/notes").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Line one\nLine two");
    assert_eq!(body["status"], "loaded");
    assert_eq!(body["caption"], "Notes loaded from file.");
}

#[tokio::test]
async fn test_notes_missing_and_error_captions() {
    let app = setup_loaded_app().await;

    let (_, missing) = get_json(app.clone(), "/api/platforms/proxmox/notes").await;
    assert_eq!(missing["status"], "missing");
    assert!(missing["content"]
        .as_str()
        .unwrap()
        .contains("/notes-proxmox.txt"));

    let (_, failed) = get_json(app, "/api/platforms/azure/notes").await;
    assert_eq!(failed["status"], "error");
    assert_eq!(failed["caption"], "Error loading notes — check console.");
}

#[tokio::test]
async fn test_notes_idle_before_loading_has_no_caption() {
    let app = build_router(AppState::new(setup_loader()));

    let (_, body) = get_json(app, "/api/platforms/vmware/notes").await;

    assert_eq!(body["status"], "idle");
    assert!(body["caption"].is_null());
}

// =============================================================================
// Errors, reload, events
// =============================================================================

#[tokio::test]
async fn test_unknown_platform_is_not_found() {
    let app = setup_loaded_app().await;

    for uri in ["/api/platforms/openstack/table", "/api/platforms/openstack/notes"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("openstack"));
    }
}

#[tokio::test]
async fn test_platform_label_accepted_as_id() {
    let app = setup_loaded_app().await;

    let (status, body) = get_json(app, "/api/platforms/AWS/table").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], "aws");
}

#[tokio::test]
async fn test_reload_is_accepted() {
    let loader = setup_loader();
    let app = build_router(AppState::new(Arc::clone(&loader)));

    let response = app
        .oneshot(test_request("POST", "/api/platforms/aws/reload"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["id"], "aws");
    assert_eq!(body["reloading"], true);

    // Reload runs in the background; wait for it to settle
    let mut events = loader.store().subscribe();
    while loader.store().dataset_pending(Platform::Aws).await {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), events.recv()).await;
    }
    assert_eq!(loader.store().dataset(Platform::Aws).await.len(), 3);
}

#[tokio::test]
async fn test_reload_unknown_platform() {
    let app = setup_loaded_app().await;

    let response = app
        .oneshot(test_request("POST", "/api/platforms/nope/reload"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_stream_content_type() {
    let app = setup_loaded_app().await;

    let response = app.oneshot(test_request("GET", "/api/events")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));
}

#[tokio::test]
async fn test_index_page_served() {
    let app = setup_loaded_app().await;

    let response = app.oneshot(test_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/static/app.js"));
}
