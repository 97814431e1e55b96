//! Routing, authentication and validation through the full middleware stack.
//!
//! Every request here is answered before a handler touches the database, so
//! these tests need no running `PostgreSQL`.

use axum::http::StatusCode;
use serde_json::json;

use techmorpho_integration_tests::{app, claims, request, send, sign, test_config, token};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_api_health() {
    let res = send(app(test_config()), request("GET", "/api/health", None, None)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["status"], "ok");
    assert_eq!(res.body["message"], "TechMorpho API is running");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let res = send(app(test_config()), request("GET", "/health/ready", None, None)).await;
    assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_responses_carry_nosniff() {
    let res = send(app(test_config()), request("GET", "/health", None, None)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let res = send(app(test_config()), request("GET", "/api/nope", None, None)).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Admin authentication
// ============================================================================

#[tokio::test]
async fn test_admin_route_without_token() {
    let res = send(
        app(test_config()),
        request("GET", "/api/admin/services", None, None),
    )
    .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.body["message"], "No token provided");
}

#[tokio::test]
async fn test_admin_route_with_garbage_token() {
    let res = send(
        app(test_config()),
        request("GET", "/api/admin/enquiries", Some("not-a-jwt"), None),
    )
    .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_admin_route_with_expired_token() {
    let mut expired = claims("admin");
    expired.iat -= 7200;
    expired.exp = expired.iat + 60;

    let res = send(
        app(test_config()),
        request("GET", "/api/admin/settings", Some(&sign(&expired)), None),
    )
    .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_admin_route_with_token_from_other_secret() {
    let mut config = test_config();
    config.jwt.secret = "a-different-secret-that-is-long-enough-4c2e".to_owned().into();
    let foreign = techmorpho_server::services::auth::TokenService::new(&config.jwt)
        .sign(&claims("super_admin"))
        .expect("sign");

    let res = send(
        app(test_config()),
        request("GET", "/api/admin/services", Some(&foreign), None),
    )
    .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_viewer_is_forbidden() {
    let res = send(
        app(test_config()),
        request("GET", "/api/admin/enquiries/stats/overview", Some(&token("viewer")), None),
    )
    .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["message"], "Admin access required");
}

#[tokio::test]
async fn test_unknown_role_is_forbidden() {
    let res = send(
        app(test_config()),
        request("GET", "/api/admin/services", Some(&token("editor")), None),
    )
    .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_auth_checked_before_body() {
    let res = send(
        app(test_config()),
        request("POST", "/api/admin/services", None, Some(&json!({}))),
    )
    .await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_create_service_requires_fields() {
    let res = send(
        app(test_config()),
        request(
            "POST",
            "/api/admin/services",
            Some(&token("admin")),
            Some(&json!({ "title": "  ", "features": "not a list" })),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Validation failed");

    let fields: Vec<&str> = res.body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"slug"));
    assert!(fields.contains(&"description"));
    assert!(fields.contains(&"features"));
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let mut req = request("POST", "/api/contact", None, None);
    req.headers_mut()
        .insert("content-type", "application/json".parse().expect("header"));
    *req.body_mut() = axum::body::Body::from("{ not json");

    let res = send(app(test_config()), req).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "body");
}

#[tokio::test]
async fn test_contact_requires_valid_email() {
    let res = send(
        app(test_config()),
        request(
            "POST",
            "/api/contact",
            None,
            Some(&json!({
                "name": "Asha",
                "email": "not-an-email",
                "service": "web-development",
                "message": "Need a new site"
            })),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "email");
    assert_eq!(res.body["errors"][0]["message"], "Valid email is required");
}

#[tokio::test]
async fn test_page_seo_requires_path() {
    let res = send(
        app(test_config()),
        request("GET", "/api/settings/page-seo", None, None),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Path parameter is required");
}

#[tokio::test]
async fn test_enquiry_list_rejects_unknown_status() {
    let res = send(
        app(test_config()),
        request(
            "GET",
            "/api/admin/enquiries?status=pending",
            Some(&token("admin")),
            None,
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "status");
}

#[tokio::test]
async fn test_status_update_rejects_unknown_status() {
    let res = send(
        app(test_config()),
        request(
            "PUT",
            "/api/admin/enquiries/3/status",
            Some(&token("super_admin")),
            Some(&json!({ "status": "closed" })),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let res = send(
        app(test_config()),
        request("GET", "/api/admin/services/abc", Some(&token("admin")), None),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Invalid id");
}

#[tokio::test]
async fn test_setting_requires_value() {
    let res = send(
        app(test_config()),
        request(
            "POST",
            "/api/admin/settings",
            Some(&token("admin")),
            Some(&json!({ "key": "site_name", "value": "", "type": "text" })),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["message"], "Value is required");
}

#[tokio::test]
async fn test_setting_rejects_unknown_type() {
    let res = send(
        app(test_config()),
        request(
            "POST",
            "/api/admin/settings",
            Some(&token("admin")),
            Some(&json!({ "key": "site_name", "value": "x", "type": "yaml" })),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["message"], "Invalid type");
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_registration_disabled() {
    let res = send(
        app(test_config()),
        request(
            "POST",
            "/api/admin/auth/register",
            None,
            Some(&json!({
                "email": "new@techmorpho.in",
                "password": "longenough",
                "name": "New Admin"
            })),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn test_registration_short_password() {
    let mut config = test_config();
    config.registration_enabled = true;

    let res = send(
        app(config),
        request(
            "POST",
            "/api/admin/auth/register",
            None,
            Some(&json!({
                "email": "new@techmorpho.in",
                "password": "12345",
                "name": "New Admin"
            })),
        ),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["field"], "password");
}

#[tokio::test]
async fn test_login_requires_fields() {
    let res = send(
        app(test_config()),
        request("POST", "/api/admin/auth/login", None, Some(&json!({}))),
    )
    .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"].as_array().map(Vec::len), Some(2));
}

// ============================================================================
// CORS
// ============================================================================

#[tokio::test]
async fn test_cors_preflight_with_configured_origin() {
    let mut config = test_config();
    config.allowed_origins = vec!["https://techmorpho.in".to_owned()];

    let req = axum::http::Request::builder()
        .method("OPTIONS")
        .uri("/api/services")
        .header("origin", "https://techmorpho.in")
        .header("access-control-request-method", "GET")
        .body(axum::body::Body::empty())
        .expect("request");

    let res = send(app(config), req).await;

    assert_eq!(
        res.headers["access-control-allow-origin"],
        "https://techmorpho.in"
    );
}

#[tokio::test]
async fn test_cors_allows_any_origin_when_unconfigured() {
    let req = axum::http::Request::builder()
        .method("OPTIONS")
        .uri("/api/settings")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "GET")
        .body(axum::body::Body::empty())
        .expect("request");

    let res = send(app(test_config()), req).await;

    assert_eq!(res.headers["access-control-allow-origin"], "*");
    assert_eq!(res.headers["access-control-max-age"], "3600");
}

// ============================================================================
// API documentation
// ============================================================================

#[tokio::test]
async fn test_openapi_document_is_served() {
    let res = send(app(test_config()), request("GET", "/openapi.json", None, None)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["info"]["title"], "TechMorpho API");
    assert_eq!(res.body["servers"][0]["url"], "https://techmorpho.in");
    assert!(res.body["paths"]["/api/services"]["get"].is_object());
    assert!(res.body["paths"]["/api/admin/services/{id}"]["delete"]["security"].is_array());
    assert!(res.body["components"]["securitySchemes"]["bearer_auth"].is_object());
}

#[tokio::test]
async fn test_swagger_ui_is_served() {
    let res = send(app(test_config()), request("GET", "/api-docs/", None, None)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.text.contains("swagger"));
}
