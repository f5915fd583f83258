mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{dashboard, logistic_model, seeded_store};
use employee_events::query::QueryEngine;
use employee_events::report::{dashboard_router, Dashboard};
use tower::ServiceExt;

fn router(dashboard: Dashboard) -> Router {
    dashboard_router(Arc::new(dashboard))
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn index_is_the_default_employee_report() {
    let store = seeded_store().await;
    let app = router(dashboard(&store));

    let (index_status, index) = get(app.clone(), "/").await;
    let (report_status, report) = get(app, "/employee/1").await;

    assert_eq!(index_status, StatusCode::OK);
    assert_eq!(report_status, StatusCode::OK);
    assert_eq!(index, report);
}

#[tokio::test]
async fn team_report_is_served_as_html() {
    let store = seeded_store().await;
    let app = router(dashboard(&store));

    let response = app
        .oneshot(Request::builder().uri("/team/2").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(content_type.starts_with("text/html"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let page = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(page.contains("<title>Team Performance: Team Beta</title>"));
    assert!(page.contains("Asked to move to the day shift"));
}

#[tokio::test]
async fn non_integer_path_id_is_rejected() {
    let store = seeded_store().await;
    let (status, _) = get(router(dashboard(&store)), "/employee/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dropdown_refresh_returns_the_selector_fragment() {
    let store = seeded_store().await;
    let app = router(dashboard(&store));

    let (status, body) = get(app.clone(), "/update_dropdown?profile_type=Team").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with(r#"<div id="selector">"#));
    assert!(body.contains("Team Gamma"));

    let (status, body) = get(app, "/update_dropdown?profile_type=Employee").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Edsger Dijkstra"));
}

#[tokio::test]
async fn dropdown_refresh_rejects_missing_or_unknown_profile() {
    let store = seeded_store().await;
    let app = router(dashboard(&store));

    let (status, body) = get(app.clone(), "/update_dropdown?profile_type=Manager").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("Manager"));

    let (status, _) = get(app, "/update_dropdown").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn filter_submission_redirects_to_the_report() {
    let store = seeded_store().await;
    let app = router(dashboard(&store));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update_data")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("profile_type=Team&user-selection=42"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/team/42");
}

#[tokio::test]
async fn filter_submission_with_bad_selection_is_rejected() {
    let store = seeded_store().await;
    let app = router(dashboard(&store));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/update_data")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("profile_type=Employee&user-selection=first"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_store_surfaces_as_server_error() {
    let missing = std::env::temp_dir().join(format!(
        "employee-events-missing-{}.db",
        uuid::Uuid::new_v4()
    ));
    let app = router(Dashboard::new(
        QueryEngine::new(&missing),
        Arc::new(logistic_model()),
    ));

    let (status, body) = get(app, "/employee/1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("event store error"));
    assert!(!missing.exists());
}
