use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};

use super::auth::{hash_password, verify_password, AuthError, JwtAuth};
use super::model::StoredUser;
use super::{ApiError, ApiJson, AppState};
use crate::components::api::{AuthResponse, User};
use crate::components::calendar::{CalendarEvent, EventColor, NewCalendarEvent};
use crate::utils::iso8601;
use crate::utils::time::parse_instant;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Event fields as sent by clients, for both create and update.
///
/// `description` and `end` tell an absent field apart from an explicit `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "iso8601::double_option")]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "iso8601::double_option")]
    pub end: Option<Option<String>>,
    #[serde(default)]
    pub all_day: Option<bool>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn parse_time(value: &str, field: &str) -> Result<DateTime<Utc>, ApiError> {
    parse_instant(value).ok_or_else(|| ApiError::Validation(format!("Invalid {}: {}", field, value)))
}

fn parse_color(value: &str) -> Result<EventColor, ApiError> {
    value.parse::<EventColor>().map_err(ApiError::Validation)
}

fn check_order(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), ApiError> {
    match end {
        Some(end) if end < start => Err(ApiError::Validation(
            "End time must not be before start time".to_string(),
        )),
        _ => Ok(()),
    }
}

impl EventFields {
    /// Turn a create request into a new event
    pub fn into_new_event(self) -> Result<NewCalendarEvent, ApiError> {
        let (Some(title), Some(start)) = (non_empty(self.title), non_empty(self.start)) else {
            return Err(ApiError::Validation(
                "Title and start time are required".to_string(),
            ));
        };

        let start = parse_time(&start, "start time")?;
        let end = match non_empty(self.end.flatten()) {
            Some(end) => Some(parse_time(&end, "end time")?),
            None => None,
        };
        check_order(start, end)?;

        let color = match non_empty(self.color) {
            Some(color) => parse_color(&color)?,
            None => EventColor::default(),
        };

        Ok(NewCalendarEvent {
            title,
            description: self.description.flatten(),
            start,
            end,
            all_day: self.all_day.unwrap_or(false),
            color,
            label: non_empty(self.label),
            location: non_empty(self.location),
        })
    }

    /// Merge an update request into an existing event.
    ///
    /// Empty strings leave `title`, `start`, `color`, `label` and `location`
    /// untouched; an empty or null `end` clears it.
    pub fn apply(self, mut event: CalendarEvent) -> Result<CalendarEvent, ApiError> {
        if let Some(title) = non_empty(self.title) {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(start) = non_empty(self.start) {
            event.start = parse_time(&start, "start time")?;
        }
        if let Some(end) = self.end {
            event.end = match non_empty(end) {
                Some(end) => Some(parse_time(&end, "end time")?),
                None => None,
            };
        }
        if let Some(all_day) = self.all_day {
            event.all_day = all_day;
        }
        if let Some(color) = non_empty(self.color) {
            event.color = parse_color(&color)?;
        }
        if let Some(label) = non_empty(self.label) {
            event.label = Some(label);
        }
        if let Some(location) = non_empty(self.location) {
            event.location = Some(location);
        }

        check_order(event.start, event.end)?;
        Ok(event)
    }
}

fn auth_response(state: &AppState, user: &StoredUser) -> Result<AuthResponse, ApiError> {
    let token = state.auth_service.generate_token(user.id, &user.email)?;
    Ok(AuthResponse {
        user: user.public(),
        token,
    })
}

/// Ids that do not parse cannot name an event
fn parse_event_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::NotFound("Event not found".to_string()))
}

/// Handler for account registration
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.name.trim().is_empty() || request.email.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation(
            "Name, email and password are required".to_string(),
        ));
    }
    if request.password != request.confirm_password {
        return Err(ApiError::Validation("Passwords do not match".to_string()));
    }
    if state
        .db
        .find_user_by_email(&request.email)
        .await
        .map_err(ApiError::Internal)?
        .is_some()
    {
        return Err(ApiError::Validation("Email already registered".to_string()));
    }

    let password_hash = hash_password(request.password).await?;
    let user = state
        .db
        .create_user(&request.name, &request.email, password_hash)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::Validation("Email already registered".to_string()))?;

    info!("Registered user {} ({})", user.id, user.email);
    Ok((StatusCode::CREATED, Json(auth_response(&state, &user)?)))
}

/// Handler for login
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = state
        .db
        .find_user_by_email(&request.email)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(request.password, user.password_hash.clone()).await? {
        warn!("Failed login attempt for {}", request.email);
        return Err(AuthError::InvalidCredentials.into());
    }

    info!("User {} successfully authenticated", user.email);
    Ok(Json(auth_response(&state, &user)?))
}

/// Handler for the signed-in user's profile
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<JwtAuth>,
) -> Result<Json<User>, ApiError> {
    let id = auth.claims.user_id().ok_or(AuthError::InvalidToken)?;
    state
        .db
        .find_user(id)
        .await
        .map_err(ApiError::Internal)?
        .map(|user| Json(user.public()))
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn list_events_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<CalendarEvent>>, ApiError> {
    let events = state.db.list_events().await.map_err(ApiError::Internal)?;
    Ok(Json(events))
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    ApiJson(fields): ApiJson<EventFields>,
) -> Result<impl IntoResponse, ApiError> {
    let event = fields.into_new_event()?;
    let created = state
        .db
        .create_event(event)
        .await
        .map_err(ApiError::Internal)?;
    info!("Created event {} ({})", created.id, created.title);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(fields): ApiJson<EventFields>,
) -> Result<Json<CalendarEvent>, ApiError> {
    let id = parse_event_id(&id)?;
    let existing = state
        .db
        .get_event(id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    let updated = fields.apply(existing)?;
    state
        .db
        .replace_event(updated)
        .await
        .map_err(ApiError::Internal)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_event_id(&id)?;
    if state.db.delete_event(id).await.map_err(ApiError::Internal)? {
        info!("Deleted event {}", id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Event not found".to_string()))
    }
}

/// Handler for health check
pub async fn health_handler() -> impl IntoResponse {
    "OK"
}
