//! Mock calendar REST API.
//!
//! An axum router over an in-memory store, with JWT bearer authentication
//! on the account and event routes.

pub mod auth;
pub mod handlers;
pub mod model;

use crate::config::Config;
use crate::error::{other_error, CalResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{middleware, Json, Router};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use self::auth::{AuthConfig, AuthError, AuthService};
use self::model::{CalendarDb, InMemoryDb};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Auth service for JWT operations
    pub auth_service: Arc<AuthService>,
    /// Users and events
    pub db: Arc<dyn CalendarDb>,
}

impl AppState {
    pub fn new(auth_service: AuthService, db: Arc<dyn CalendarDb>) -> Self {
        Self {
            auth_service: Arc::new(auth_service),
            db,
        }
    }

    /// State backed by an in-memory store, seeded when the config asks for it
    pub fn from_config(config: &Config) -> CalResult<Self> {
        let db = if config.seed_data {
            InMemoryDb::seeded(&config.timezone).map_err(|e| other_error(&e))?
        } else {
            info!("Starting with an empty database");
            InMemoryDb::new()
        };

        Ok(Self::new(
            AuthService::new(AuthConfig::from_config(config)),
            Arc::new(db),
        ))
    }
}

/// Errors a handler can answer with
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete input
    Validation(String),
    NotFound(String),
    Auth(AuthError),
    /// Storage or other failure; details are logged, not sent
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Auth(err) => return err.into_response(),
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Internal(err) => {
                error!("Internal error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// JSON body extractor whose rejections answer like any other validation error
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::Validation(rejection.body_text())),
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(handlers::me_handler))
        .route(
            "/events",
            get(handlers::list_events_handler).post(handlers::create_event_handler),
        )
        .route(
            "/events/{id}",
            put(handlers::update_event_handler).delete(handlers::delete_event_handler),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/auth/register", post(handlers::register_handler))
        .route("/auth/login", post(handlers::login_handler))
        .route("/health", get(handlers::health_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
