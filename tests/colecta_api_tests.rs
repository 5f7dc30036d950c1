mod common;

use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;

use common::{bearer, body_json, create_test_app, get, json_request};
use pickup_routing::middleware::auth::UserRole;

#[tokio::test]
async fn test_colectas_require_driver_role() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(get("/pickups/colectas/available", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let admin = bearer(UserRole::Admin);
    let response = app
        .oneshot(get("/pickups/colectas/available", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_claim_rejects_malformed_body() {
    let app = create_test_app();
    let auth = bearer(UserRole::Driver);

    let response = app
        .oneshot(json_request(
            "POST",
            "/pickups/colectas/claim",
            Some(&auth),
            json!({ "shift": "MORNING" }),
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_complete_requires_driver_role() {
    let app = create_test_app();
    let admin = bearer(UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "POST",
            "/assignments/complete",
            Some(&admin),
            json!({
                "client_id": "550e8400-e29b-41d4-a716-446655440000",
                "packages_picked_up": 3
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_complete_rejects_negative_count() {
    let app = create_test_app();
    let auth = bearer(UserRole::Driver);

    let response = app
        .oneshot(json_request(
            "POST",
            "/assignments/complete",
            Some(&auth),
            json!({
                "client_id": "550e8400-e29b-41d4-a716-446655440000",
                "packages_picked_up": -1
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
