#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use kalenteri::server::auth::{AuthConfig, AuthService};
use kalenteri::server::model::InMemoryDb;
use kalenteri::server::{router, AppState};
use kalenteri::utils::time::CalendarZone;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let db = InMemoryDb::seeded(&CalendarZone::Local).unwrap();
    let auth = AuthService::new(AuthConfig {
        jwt_secret: "test-secret".to_string(),
        token_expiration_minutes: 60,
    });
    router(AppState::new(auth, Arc::new(db)))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "test@example.com", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_login_with_seeded_user() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "test@example.com", "password": "password123" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["id"], 1);
    assert_eq!(body["user"]["name"], "Test User");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = app();
    for credentials in [
        json!({ "email": "test@example.com", "password": "wrong" }),
        json!({ "email": "nobody@example.com", "password": "password123" }),
    ] {
        let (status, body) =
            send(&app, Method::POST, "/auth/login", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_register_then_me() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "engine",
            "confirmPassword": "engine"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["id"], 101);
    assert_eq!(
        body["user"]["avatar"],
        "https://ui-avatars.com/api/?name=Ada%20Lovelace&background=random"
    );

    let token = body["token"].as_str().unwrap().to_string();
    let (status, me) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");
}

#[tokio::test]
async fn test_register_rejections() {
    let app = app();
    let cases = [
        (
            json!({ "name": "A", "email": "a@example.com", "password": "x", "confirmPassword": "y" }),
            "Passwords do not match",
        ),
        (
            json!({ "name": "A", "email": "test@example.com", "password": "x", "confirmPassword": "x" }),
            "Email already registered",
        ),
        (
            json!({ "email": "a@example.com", "password": "x", "confirmPassword": "x" }),
            "Name, email and password are required",
        ),
    ];
    for (body, message) in cases {
        let (status, response) = send(&app, Method::POST, "/auth/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], message);
    }
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = app();
    for (method, uri) in [
        (Method::GET, "/events"),
        (Method::POST, "/events"),
        (Method::PUT, "/events/1"),
        (Method::DELETE, "/events/1"),
        (Method::GET, "/auth/me"),
    ] {
        let (status, _) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);

        let (status, _) = send(&app, method, uri, Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_list_seeded_events() {
    let app = app();
    let token = login(&app).await;
    let (status, body) = send(&app, Method::GET, "/events", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["title"], "Team Meeting");
    assert_eq!(events[1]["color"], "emerald");
    assert!(events[2].get("end").is_none());
}

#[tokio::test]
async fn test_create_event_with_defaults() {
    let app = app();
    let token = login(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(json!({ "title": "Standup", "start": "2024-01-01T09:00:00Z" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_u64());
    assert_eq!(body["id"], 101);
    assert_eq!(body["allDay"], false);
    assert_eq!(body["color"], "blue");
    assert_eq!(body["start"], "2024-01-01T09:00:00.000Z");

    let (_, list) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_create_event_validation() {
    let app = app();
    let token = login(&app).await;
    for body in [
        json!({ "title": "Standup" }),
        json!({ "start": "2024-01-01T09:00:00Z" }),
        json!({ "title": "Standup", "start": "soon" }),
        json!({ "title": "Standup", "start": "2024-01-01T09:00:00Z", "color": "teal" }),
        json!({ "title": "Standup", "start": "2024-01-01T09:00:00Z", "end": "2024-01-01T08:00:00Z" }),
    ] {
        let (status, response) = send(&app, Method::POST, "/events", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["message"].is_string());
    }
}

#[tokio::test]
async fn test_naive_start_is_stored_as_utc() {
    let app = app();
    let token = login(&app).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/events",
        Some(&token),
        Some(json!({ "title": "Standup", "start": "2024-01-01T09:00", "end": "2024-01-01T09:15" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["start"], "2024-01-01T09:00:00.000Z");
    assert_eq!(body["end"], "2024-01-01T09:15:00.000Z");
}

#[tokio::test]
async fn test_malformed_bodies_answer_with_message() {
    let app = app();
    let token = login(&app).await;
    let bodies = [
        json!({ "title": "Standup", "start": "2024-01-01T09:00:00Z", "allDay": "yes" }),
        json!({ "title": 7, "start": "2024-01-01T09:00:00Z" }),
    ];
    for body in bodies {
        let (status, response) = send(&app, Method::POST, "/events", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["message"].is_string());
    }

    let (status, response) = send(&app, Method::POST, "/auth/login", None, Some(json!([1, 2]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["message"].is_string());
}

#[tokio::test]
async fn test_body_without_content_type_is_a_validation_error() {
    let app = app();
    let token = login(&app).await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/events")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(
            json!({ "title": "Standup", "start": "2024-01-01T09:00:00Z" }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].as_str().unwrap().contains("Content-Type"));

    let (_, list) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_update_event_merges_fields() {
    let app = app();
    let token = login(&app).await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/events/1",
        Some(&token),
        Some(json!({ "title": "", "description": null, "color": "orange", "location": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["title"], "Team Meeting");
    assert!(body.get("description").is_none());
    assert_eq!(body["color"], "orange");
    assert_eq!(body["location"], "Conference Room A");
    assert!(body["end"].is_string());

    let (status, body) = send(
        &app,
        Method::PUT,
        "/events/1",
        Some(&token),
        Some(json!({ "end": null, "allDay": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("end").is_none());
    assert_eq!(body["allDay"], true);
}

#[tokio::test]
async fn test_update_unknown_event() {
    let app = app();
    let token = login(&app).await;
    for uri in ["/events/999", "/events/abc"] {
        let (status, body) = send(&app, Method::PUT, uri, Some(&token), Some(json!({ "title": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Event not found");
    }
}

#[tokio::test]
async fn test_delete_event() {
    let app = app();
    let token = login(&app).await;

    let (status, _) = send(&app, Method::DELETE, "/events/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = send(&app, Method::GET, "/events", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 3);

    let (status, body) = send(&app, Method::DELETE, "/events/2", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, list) = send(&app, Method::GET, "/events", Some(&token), None).await;
    let ids: Vec<u64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);
}
