//! HTTP-level tests: the assembled router driven with `tower::ServiceExt`,
//! asserting the action-result contract (`success`/`error`) and the cron
//! guard without binding a socket.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use linen_server::core::{Config, ServerState, StockVersions};
use linen_server::db::DbService;
use linen_server::db::repository::item;
use linen_server::routes;
use linen_server::services::HistoryNotifier;

async fn test_app(cron_secret: Option<&str>) -> (tempfile::TempDir, Router) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("linen.db");
    let db = DbService::new(path.to_str().expect("utf-8 path"))
        .await
        .expect("open database");
    item::seed_defaults(&db.pool).await.expect("seed items");

    let config = Config {
        http_port: 0,
        database_path: path.to_string_lossy().into_owned(),
        environment: "test".into(),
        cron_secret: cron_secret.map(str::to_string),
        request_timeout_ms: 1000,
    };
    let state = ServerState {
        config,
        pool: db.pool,
        versions: Arc::new(StockVersions::new()),
        notifier: HistoryNotifier::new(),
    };
    (dir, routes::build_app().with_state(state))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn json_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, app) = test_app(None).await;
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn stock_mutations_roundtrip_over_http() {
    let (_dir, app) = test_app(None).await;

    // Delta
    let response = app
        .clone()
        .oneshot(json_post(
            "/api/stock/delta",
            r#"{"item_id":"bath-towel","delta":100,"reason":"PURCHASE","memo":null}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    // Correction down to 80
    let response = app
        .clone()
        .oneshot(json_post(
            "/api/stock/correction",
            r#"{"item_id":"bath-towel","absolute_value":80,"memo":"実盤"}"#,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["shelf_count"], 80);

    // Listing reflects both writes
    let response = app
        .clone()
        .oneshot(Request::get("/api/stock").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    let bath = body
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["item_id"] == "bath-towel")
        .unwrap();
    assert_eq!(bath["shelf_count"], 80);

    // Two mutations bumped the stock version twice
    let response = app
        .oneshot(Request::get("/api/stock/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await["stock"], 2);
}

#[tokio::test]
async fn unknown_item_mutation_reports_failure_not_fault() {
    let (_dir, app) = test_app(None).await;

    let response = app
        .oneshot(json_post(
            "/api/stock/delta",
            r#"{"item_id":"no-such-item","delta":1,"reason":"OTHER","memo":null}"#,
        ))
        .await
        .unwrap();

    // Action endpoints answer 200 with a failure object, not an HTTP error
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("no-such-item")
    );
}

#[tokio::test]
async fn csv_upload_imports_bookings() {
    let (_dir, app) = test_app(None).await;

    let csv = "booking_id,checkin_date,guests\nB-1,2026-08-15,4\nB-2,bad-date,2\n";
    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"bookings.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n--{boundary}--\r\n"
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/bookings/import")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["diagnostics"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn settings_roundtrip() {
    let (_dir, app) = test_app(None).await;

    // Unset keys read as empty string
    let response = app
        .clone()
        .oneshot(
            Request::get("/api/settings/GOOGLE_SHEET_URL")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["value"], "");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/settings/GOOGLE_SHEET_URL")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"value":"https://example.com/sheet"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await["success"], true);

    let response = app
        .oneshot(
            Request::get("/api/settings/GOOGLE_SHEET_URL")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        body_json(response).await["value"],
        "https://example.com/sheet"
    );
}

#[tokio::test]
async fn cron_requires_bearer_secret_when_configured() {
    let (_dir, app) = test_app(Some("s3cret")).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/cron/daily-checkin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/cron/daily-checkin")
                .header(header::AUTHORIZATION, "Bearer wrong")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Right secret but no sheet URL configured: passes auth, fails validation
    let response = app
        .oneshot(
            Request::get("/api/cron/daily-checkin")
                .header(header::AUTHORIZATION, "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sync_without_url_reports_failure() {
    let (_dir, app) = test_app(None).await;

    let response = app
        .oneshot(json_post("/api/bookings/sync", r#"{"url":null}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "URL is required");
}
