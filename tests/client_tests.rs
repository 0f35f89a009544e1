#![cfg(feature = "server")]

use chrono::{TimeZone, Utc};
use kalenteri::components::api::{EventApi, LoginCredentials, RegisterCredentials, Session};
use kalenteri::components::calendar::{EventColor, EventDraft, EventPatch};
use kalenteri::components::{ApiClient, AuthService, EventService, EventsQueryHandle, SessionStore};
use kalenteri::error::Error;
use kalenteri::server::auth::{AuthConfig, AuthService as ServerAuth};
use kalenteri::server::model::InMemoryDb;
use kalenteri::server::{router, AppState};
use kalenteri::utils::time::CalendarZone;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

/// Start a seeded mock API on a loopback port
async fn spawn_server() -> Url {
    let db = InMemoryDb::seeded(&CalendarZone::Local).unwrap();
    let auth = ServerAuth::new(AuthConfig {
        jwt_secret: "test-secret".to_string(),
        token_expiration_minutes: 60,
    });
    let app = router(AppState::new(auth, Arc::new(db)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{}", addr)).unwrap()
}

async fn client() -> (ApiClient, TempDir) {
    let base_url = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    (ApiClient::new(base_url, SessionStore::new(dir.path())), dir)
}

async fn signed_in() -> (ApiClient, TempDir) {
    let (client, dir) = client().await;
    AuthService::new(client.clone())
        .login(&LoginCredentials {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    (client, dir)
}

#[tokio::test]
async fn test_login_persists_session() {
    let (client, _dir) = client().await;
    let auth = AuthService::new(client.clone());
    assert!(auth.session().is_none());

    let response = auth
        .login(&LoginCredentials {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();

    let session = auth.session().unwrap();
    assert_eq!(session.token.as_deref(), Some(response.token.as_str()));
    assert_eq!(session.user.unwrap().email, "test@example.com");

    let me = auth.current_user().await.unwrap();
    assert_eq!(me.id, 1);

    auth.logout().unwrap();
    assert!(auth.session().is_none());
}

#[tokio::test]
async fn test_failed_login_surfaces_server_message() {
    let (client, _dir) = client().await;
    let result = AuthService::new(client)
        .login(&LoginCredentials {
            email: "test@example.com".to_string(),
            password: "nope".to_string(),
        })
        .await;

    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_register_checks_passwords_locally() {
    let (client, _dir) = client().await;
    let auth = AuthService::new(client);
    let result = auth
        .register(&RegisterCredentials {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "one".to_string(),
            confirm_password: "two".to_string(),
        })
        .await;
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(auth.session().is_none());

    let response = auth
        .register(&RegisterCredentials {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "engine".to_string(),
            confirm_password: "engine".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(response.user.id, 101);
    assert!(auth.session().is_some());
}

#[tokio::test]
async fn test_event_round_trip_keeps_instants() {
    let (client, _dir) = signed_in().await;
    let events = EventsQueryHandle::new(Arc::new(EventService::new(client)));

    let start = Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 3, 5, 10, 15, 0).unwrap();
    let mut draft = EventDraft::new(start);
    draft.title = "Planning".to_string();
    draft.end = Some(end);
    draft.color = EventColor::Violet;

    let created = events.create_event(draft).await.unwrap();
    assert_eq!(created.start, start);
    assert_eq!(created.end, Some(end));

    let fetched = events.events().await.unwrap();
    let stored = fetched.iter().find(|e| e.id == created.id).unwrap();
    assert_eq!(stored, &created);

    let patch = EventPatch {
        end: Some(None),
        title: Some("Planning v2".to_string()),
        ..Default::default()
    };
    let updated = events.update_event(created.id, &patch).await.unwrap();
    assert_eq!(updated.title, "Planning v2");
    assert_eq!(updated.end, None);
    assert_eq!(updated.start, start);

    events.delete_event(created.id).await.unwrap();
    let after = events.events().await.unwrap();
    assert!(after.iter().all(|e| e.id != created.id));
    assert_eq!(after.len(), 3);

    events.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_missing_event_is_an_api_error() {
    let (client, _dir) = signed_in().await;
    let service = EventService::new(client);
    let result = service.delete_event(999).await;
    assert!(matches!(result, Err(Error::Api { status: 404, .. })));
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let (client, _dir) = client().await;
    client
        .session()
        .save(&Session {
            user: None,
            token: Some("expired-or-forged".to_string()),
        })
        .unwrap();

    let service = EventService::new(client.clone());
    let result = service.try_fetch_events().await;
    assert!(matches!(result, Err(Error::Unauthorized)));
    assert!(client.session().load().is_none());

    // The read path swallows the failure
    assert!(service.fetch_events().await.is_empty());
}
