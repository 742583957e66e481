//! End-to-end tests of the HTTP surface, driven through `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use lms_auth::{AuthConfig, MockJwtValidator};
use lms_core::Role;
use lms_gateway::{create_router, GatewayConfig, GatewayState};
use lms_service::LmsService;
use lms_store::MemoryStore;

fn app() -> Router {
    let config = GatewayConfig {
        auth: AuthConfig {
            bcrypt_cost: 4,
            ..AuthConfig::default()
        },
        ..GatewayConfig::default()
    };
    let tokens = Arc::new(MockJwtValidator);
    let lms = Arc::new(LmsService::new(
        Arc::new(MemoryStore::with_demo_data()),
        Arc::clone(&tokens),
        config.service_config(),
    ));
    create_router(GatewayState::new(lms, tokens, config))
}

fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

fn bearer(user: &str, role: Role) -> String {
    format!("Bearer {}", MockJwtValidator::token_for(user, role))
}

fn json_request(method: Method, uri: &str, token: Option<String>, body: &Value) -> Request<Body> {
    let mut builder = request(method, uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = app();
    let (status, body) = send(&app, request(Method::GET, "/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn login_then_me() {
    let app = app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            &json!({"email": "instructor@university.edu", "password": "password123", "role": "instructor"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    assert!(body["data"]["user"].get("password").is_none());

    let (status, me) = send(
        &app,
        request(Method::GET, "/api/auth/me")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["_id"], "instructor1");
    assert_eq!(me["data"]["lastName"], "Johnson");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app();
    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            &json!({"email": "student@university.edu", "password": "nope-nope", "role": "student"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "INVALID_PASSWORD");
}

#[tokio::test]
async fn session_routes_require_a_token() {
    let app = app();
    let (status, body) = send(
        &app,
        request(Method::GET, "/api/enrollments/student/me")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NOT_AUTHENTICATED");

    let (status, _) = send(
        &app,
        request(Method::GET, "/api/auth/me")
            .header(header::AUTHORIZATION, "Bearer garbage")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_endpoints_answer_not_found() {
    let app = app();
    let (status, body) = send(
        &app,
        request(Method::GET, "/api/nothing-here?x=1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "endpoint not found: GET /api/nothing-here");

    let (status, body) = send(
        &app,
        request(Method::PATCH, "/api/courses").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "endpoint not found: PATCH /api/courses");
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn enrollment_conflicts() {
    let app = app();
    let john = bearer("student1", Role::Student);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/enrollments", Some(john.clone()), &json!({"courseId": "course1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_ENROLLED");

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/enrollments", Some(john), &json!({"courseId": "missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "COURSE_NOT_FOUND");
}

#[tokio::test]
async fn enroll_creates_and_counts() {
    let app = app();
    let emily = bearer("student4", Role::Student);

    let (status, body) = send(
        &app,
        json_request(Method::POST, "/api/enrollments", Some(emily.clone()), &json!({"courseId": "course3"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["student"]["_id"], "student4");

    let (_, mine) = send(
        &app,
        request(Method::GET, "/api/enrollments/student/me")
            .header(header::AUTHORIZATION, emily)
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(mine["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn lists_carry_pagination() {
    let app = app();
    let (status, body) = send(
        &app,
        request(Method::GET, "/api/users?role=student&limit=2&page=1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["pages"], 3);
}

#[tokio::test]
async fn multipart_material_upload() {
    let app = app();
    let boundary = "lms-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"title\"\r\n\r\n\
         Week 1 slides\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"course\"\r\n\r\n\
         course3\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"fileType\"\r\n\r\n\
         pdf\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"slides.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\n\
         %PDF-1.4\r\n\
         --{boundary}--\r\n"
    );

    let (status, material) = send(
        &app,
        request(Method::POST, "/api/materials")
            .header(header::AUTHORIZATION, bearer("instructor1", Role::Instructor))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(material["data"]["title"], "Week 1 slides");
    assert_eq!(material["data"]["originalName"], "slides.pdf");
    assert_eq!(material["data"]["size"], 8);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app();
    let (status, body) = send(
        &app,
        request(Method::POST, "/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn cors_allows_any_origin_by_default() {
    let app = app();
    let response = app
        .oneshot(
            request(Method::GET, "/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}
