mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;

use common::{bearer, body_json, create_test_app, get, json_request};
use pickup_routing::middleware::auth::UserRole;

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["service"], "pickup-routing");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_pickups_requires_token() {
    let app = create_test_app();
    let response = app
        .oneshot(get("/pickups?start_date=2024-05-01&end_date=2024-05-07", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_pickups_rejects_garbage_token() {
    let app = create_test_app();
    let response = app
        .oneshot(get(
            "/pickups?start_date=2024-05-01&end_date=2024-05-07",
            Some("Bearer not-a-jwt"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_surface_is_forbidden_for_drivers() {
    let app = create_test_app();
    let auth = bearer(UserRole::Driver);

    let response = app
        .clone()
        .oneshot(get(
            "/pickups?start_date=2024-05-01&end_date=2024-05-07",
            Some(&auth),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/pickups/runs/550e8400-e29b-41d4-a716-446655440000/inform",
            Some(&auth),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_driver_surface_is_forbidden_for_admins() {
    let app = create_test_app();
    let auth = bearer(UserRole::Admin);

    let response = app
        .oneshot(get("/pickups/driver/today", Some(&auth)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_create_run_requires_assignments() {
    let app = create_test_app();
    let auth = bearer(UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "POST",
            "/pickups",
            Some(&auth),
            json!({
                "driver_id": "550e8400-e29b-41d4-a716-446655440000",
                "date": "2024-05-01",
                "assignments": []
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_runs_rejects_inverted_range() {
    let app = create_test_app();
    let auth = bearer(UserRole::Admin);

    let response = app
        .oneshot(get(
            "/pickups?start_date=2024-05-07&end_date=2024-05-01",
            Some(&auth),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_copy_run_requires_dates() {
    let app = create_test_app();
    let auth = bearer(UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "POST",
            "/pickups/runs/550e8400-e29b-41d4-a716-446655440000/copy",
            Some(&auth),
            json!({ "dates": [] }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_assignment_requires_some_field() {
    let app = create_test_app();
    let auth = bearer(UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/pickups/assignments/550e8400-e29b-41d4-a716-446655440000",
            Some(&auth),
            json!({}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_assignment_rejects_negative_cost() {
    let app = create_test_app();
    let auth = bearer(UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/pickups/assignments/550e8400-e29b-41d4-a716-446655440000",
            Some(&auth),
            json!({ "cost": -500 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_status_enforces_picked_pairing() {
    let app = create_test_app();
    let auth = bearer(UserRole::Driver);

    // RETIRADO sin conteo: rechazado antes de tocar la base
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/pickups/assignments/550e8400-e29b-41d4-a716-446655440000/status",
            Some(&auth),
            json!({ "status": "RETIRADO" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Conteo junto con un estado que no es RETIRADO: también rechazado
    let response = app
        .oneshot(json_request(
            "PUT",
            "/pickups/assignments/550e8400-e29b-41d4-a716-446655440000/status",
            Some(&auth),
            json!({ "status": "EN_RUTA", "packages_picked_up": 2 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
