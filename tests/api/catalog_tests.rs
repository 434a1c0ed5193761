//! Technology, Course, Talent and Batch API Tests

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use crate::common::{expect_status, unique_email, unique_name, TestApp};

fn id_of(json: &Value) -> String {
    json["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Requests rejected before the database
// ============================================================================

#[tokio::test]
async fn test_malformed_tenant_id_is_bad_request() {
    let app = TestApp::offline();

    let json = expect_status(app.get("/api/v1/tenant/not-a-uuid/courses").await, StatusCode::BAD_REQUEST).await;

    assert_eq!(json["code"], 10002);
    assert_eq!(json["message"], "Invalid tenant ID");
    app.shutdown().await;
}

#[tokio::test]
async fn test_nil_tenant_is_rejected() {
    let app = TestApp::offline();
    let uri = format!("/api/v1/tenant/{}/talents", Uuid::nil());

    let json = expect_status(app.get(&uri).await, StatusCode::BAD_REQUEST).await;

    assert_eq!(json["code"], 10007);
    app.shutdown().await;
}

#[tokio::test]
async fn test_invalid_body_reports_field_errors() {
    let app = TestApp::offline();

    let response = app
        .post_json("/api/v1/technologies", json!({ "name": "", "rating": 42 }))
        .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;

    let fields: Vec<&str> = json["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["name", "rating"]);
    app.shutdown().await;
}

#[tokio::test]
async fn test_malformed_actor_header_is_rejected() {
    let app = TestApp::offline();
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/v1/tenant/{}/courses", Uuid::new_v4()))
        .header("X-Actor-Id", "someone")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({ "name": "Rust", "code": "RS" }).to_string()))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    app.shutdown().await;
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = TestApp::offline();

    let response = app.get("/api/v1/guilds").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    app.shutdown().await;
}

// ============================================================================
// Database-backed flows
// ============================================================================

#[tokio::test]
async fn test_technology_lifecycle() {
    let Some(app) = TestApp::connected().await else {
        return;
    };
    let name = unique_name("rust");

    let created = expect_status(
        app.post_json("/api/v1/technologies", json!({ "name": name, "language": "en", "rating": 9 }))
            .await,
        StatusCode::CREATED,
    )
    .await;
    let id = id_of(&created);

    // Names are unique regardless of case
    let duplicate = app
        .post_json("/api/v1/technologies", json!({ "name": name.to_uppercase() }))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let listed = app
        .get(&format!("/api/v1/technologies?search={}&limit=5", name))
        .await;
    assert_eq!(listed.status(), StatusCode::OK);
    assert_eq!(listed.headers()["x-total-count"], "1");

    let deleted = app
        .request(Method::DELETE, &format!("/api/v1/technologies/{}", id), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let gone = app.get(&format!("/api/v1/technologies/{}", id)).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
    app.shutdown().await;
}

#[tokio::test]
async fn test_course_is_invisible_to_other_tenants() {
    let Some(app) = TestApp::connected().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    let other = Uuid::new_v4();

    let technology = expect_status(
        app.post_json("/api/v1/technologies", json!({ "name": unique_name("sql") }))
            .await,
        StatusCode::CREATED,
    )
    .await;

    let course = expect_status(
        app.post_json(
            &format!("/api/v1/tenant/{}/courses", tenant),
            json!({
                "name": "Databases",
                "code": "DB-101",
                "technology_ids": [id_of(&technology)],
            }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(course["technologies"].as_array().unwrap().len(), 1);

    let same_tenant = app
        .get(&format!("/api/v1/tenant/{}/courses/{}", tenant, id_of(&course)))
        .await;
    assert_eq!(same_tenant.status(), StatusCode::OK);

    let other_tenant = app
        .get(&format!("/api/v1/tenant/{}/courses/{}", other, id_of(&course)))
        .await;
    assert_eq!(other_tenant.status(), StatusCode::NOT_FOUND);

    let unknown_technology = app
        .post_json(
            &format!("/api/v1/tenant/{}/courses", tenant),
            json!({ "name": "Networks", "code": "NET-1", "technology_ids": [Uuid::new_v4()] }),
        )
        .await;
    assert_eq!(unknown_technology.status(), StatusCode::BAD_REQUEST);

    // Nothing from the failed create was kept
    let listed = app.get(&format!("/api/v1/tenant/{}/courses", tenant)).await;
    assert_eq!(listed.headers()["x-total-count"], "1");
    app.shutdown().await;
}

#[tokio::test]
async fn test_talent_pages_are_stable_when_names_tie() {
    let Some(app) = TestApp::connected().await else {
        return;
    };
    let base = format!("/api/v1/tenant/{}/talents", Uuid::new_v4());

    let mut created = Vec::new();
    for _ in 0..5 {
        let talent = expect_status(
            app.post_json(
                &base,
                json!({ "first_name": "Sam", "last_name": "Same", "email": unique_email() }),
            )
            .await,
            StatusCode::CREATED,
        )
        .await;
        created.push(id_of(&talent));
    }

    let mut seen = Vec::new();
    for page in 0..3 {
        let listed = expect_status(
            app.get(&format!("{}?limit=2&offset={}", base, page)).await,
            StatusCode::OK,
        )
        .await;
        seen.extend(listed.as_array().unwrap().iter().map(id_of));
    }

    // Every row exactly once across pages
    let mut expected = created.clone();
    expected.sort();
    seen.sort();
    assert_eq!(seen, expected);
    app.shutdown().await;
}

#[tokio::test]
async fn test_batch_enrollment_respects_seats() {
    let Some(app) = TestApp::connected().await else {
        return;
    };
    let tenant = Uuid::new_v4();
    let base = format!("/api/v1/tenant/{}", tenant);

    let course = expect_status(
        app.post_json(&format!("{}/courses", base), json!({ "name": "Rust", "code": "RS-1" }))
            .await,
        StatusCode::CREATED,
    )
    .await;

    let mut talent_ids = Vec::new();
    for first_name in ["Ada", "Alan"] {
        let talent = expect_status(
            app.post_json(
                &format!("{}/talents", base),
                json!({ "first_name": first_name, "last_name": "Test", "email": unique_email() }),
            )
            .await,
            StatusCode::CREATED,
        )
        .await;
        talent_ids.push(id_of(&talent));
    }

    let batch = expect_status(
        app.post_json(
            &format!("{}/batches", base),
            json!({ "course_id": id_of(&course), "name": "Spring", "code": "SP-1", "total_seats": 1 }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let enroll_uri = format!("{}/batches/{}/talents", base, id_of(&batch));

    let too_many = app
        .request(Method::PUT, &enroll_uri, Some(json!({ "talent_ids": talent_ids })))
        .await;
    assert_eq!(too_many.status(), StatusCode::BAD_REQUEST);

    let enrolled = expect_status(
        app.request(Method::PUT, &enroll_uri, Some(json!({ "talent_ids": [talent_ids[0]] })))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(enrolled["talent_ids"], json!([talent_ids[0]]));

    // Talents filtered by the course they are enrolled in
    let by_course = app
        .get(&format!("{}/talents?course_id={}", base, id_of(&course)))
        .await;
    assert_eq!(by_course.headers()["x-total-count"], "1");

    // A course with batches cannot be deleted
    let in_use = app
        .request(Method::DELETE, &format!("{}/courses/{}", base, id_of(&course)), None)
        .await;
    assert_eq!(in_use.status(), StatusCode::CONFLICT);

    let removed = expect_status(
        app.request(Method::DELETE, &enroll_uri, Some(json!({ "talent_ids": [talent_ids[0]] })))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(removed["talent_ids"], json!([]));

    // Shutdown drains the queue, so both enrollment changes are stored
    let db = app.db.clone();
    app.shutdown().await;
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE tenant_id = $1")
        .bind(tenant)
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(stored, 2);
}
