//! Integration tests for the report CRUD surface
//!
//! Single-entity passthrough semantics: standard 404 for missing reports,
//! 400 for invalid payloads, listings filtered by industry and region.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

use mrd_common::db::{init_memory_database, SqliteReportStore};
use mrd_server::{build_router, AppState};

async fn setup_app() -> Router {
    let pool = init_memory_database().await.expect("Should open in-memory database");
    let store = Arc::new(SqliteReportStore::new(pool));
    build_router(AppState::new(store))
}

fn request(method: &str, uri: &str, body: Option<&Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn new_report_body(industry: &str, region: &str) -> Value {
    json!({
        "industryName": industry,
        "companyType": "Individual",
        "reportScope": "Locality Specific",
        "region": region,
        "submittedAt": "2024-06-01T10:30:00Z",
        "formMode": "production",
    })
}

/// Create a report through the API and return its id
async fn create_report(app: &Router, body: &Value) -> String {
    let response = app
        .clone()
        .oneshot(request("POST", "/api/reports", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let report = extract_json(response.into_body()).await;
    report["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mrd-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_create_then_get_report() {
    let app = setup_app().await;
    let id = create_report(&app, &new_report_body("Bakeries", "Berlin")).await;

    let response = app
        .oneshot(request("GET", &format!("/api/reports/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = extract_json(response.into_body()).await;
    assert_eq!(report["industryName"], "Bakeries");
    assert_eq!(report["region"], "Berlin");
    assert!(report["createdAt"].is_string());
    assert!(report["executiveSummary"].is_null());
}

#[tokio::test]
async fn test_create_rejects_invalid_payload() {
    let app = setup_app().await;

    // industryName missing
    let response = app
        .oneshot(request(
            "POST",
            "/api/reports",
            Some(&json!({ "companyType": "Individual" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_get_missing_report_is_404() {
    let app = setup_app().await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/reports/00000000-0000-0000-0000-000000000042",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Malformed id fails path extraction before reaching the store
    let response = app
        .oneshot(request("GET", "/api/reports/not-a-uuid", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_listings_filter_by_industry_and_region() {
    let app = setup_app().await;
    create_report(&app, &new_report_body("Bakeries", "Berlin")).await;
    create_report(&app, &new_report_body("Hair Salon", "Pune")).await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/reports", None))
        .await
        .unwrap();
    let all = extract_json(response.into_body()).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(request("GET", "/api/reports/industry/Bakeries", None))
        .await
        .unwrap();
    let bakeries = extract_json(response.into_body()).await;
    assert_eq!(bakeries.as_array().unwrap().len(), 1);
    assert_eq!(bakeries[0]["industryName"], "Bakeries");

    let response = app
        .clone()
        .oneshot(request("GET", "/api/reports/region/Pune", None))
        .await
        .unwrap();
    let pune = extract_json(response.into_body()).await;
    assert_eq!(pune.as_array().unwrap().len(), 1);
    assert_eq!(pune[0]["region"], "Pune");

    let response = app
        .oneshot(request("GET", "/api/reports/region/Nowhere", None))
        .await
        .unwrap();
    let empty = extract_json(response.into_body()).await;
    assert_eq!(empty.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_patch_updates_named_fields_only() {
    let app = setup_app().await;
    let id = create_report(&app, &new_report_body("Bakeries", "Berlin")).await;

    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/reports/{id}"),
            Some(&json!({ "industryName": "Patisseries" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let report = extract_json(response.into_body()).await;
    assert_eq!(report["industryName"], "Patisseries");
    assert_eq!(report["region"], "Berlin");

    // Section slots can be set through the same patch surface
    let response = app
        .clone()
        .oneshot(request(
            "PATCH",
            &format!("/api/reports/{id}"),
            Some(&json!({
                "marketDynamics": {
                    "drivers": ["tourism"],
                    "restraints": [],
                    "opportunities": [],
                    "challenges": [],
                }
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = extract_json(response.into_body()).await;
    assert_eq!(report["marketDynamics"]["drivers"][0], "tourism");
}

#[tokio::test]
async fn test_patch_missing_report_is_404() {
    let app = setup_app().await;

    let response = app
        .oneshot(request(
            "PATCH",
            "/api/reports/00000000-0000-0000-0000-000000000042",
            Some(&json!({ "industryName": "Nope" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_404() {
    let app = setup_app().await;
    let id = create_report(&app, &new_report_body("Bakeries", "Berlin")).await;

    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/reports/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);

    // Second delete and subsequent get both 404
    let response = app
        .clone()
        .oneshot(request("DELETE", &format!("/api/reports/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(request("GET", &format!("/api/reports/{id}"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
