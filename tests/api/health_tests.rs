//! Health Check API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{expect_status, TestApp};

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::offline();

    let json = expect_status(app.get("/health").await, StatusCode::OK).await;

    assert_eq!(json["status"], "healthy");
    assert!(json.get("version").is_some());
    app.shutdown().await;
}

#[tokio::test]
async fn test_liveness_endpoint() {
    // Liveness does not depend on the database
    let app = TestApp::offline();

    let json = expect_status(app.get("/health/live").await, StatusCode::OK).await;

    assert_eq!(json["status"], "alive");
    app.shutdown().await;
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let app = TestApp::offline();

    let json = expect_status(app.get("/health/ready").await, StatusCode::SERVICE_UNAVAILABLE).await;

    assert_eq!(json["status"], "unhealthy");
    assert_eq!(json["database"]["status"], "unhealthy");
    app.shutdown().await;
}

#[tokio::test]
async fn test_readiness_with_database() {
    let Some(app) = TestApp::connected().await else {
        return;
    };

    let json = expect_status(app.get("/health/ready").await, StatusCode::OK).await;

    assert!(json["database"]["latency_ms"].is_number());
    app.shutdown().await;
}
