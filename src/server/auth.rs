use super::AppState;
use crate::config::Config;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};

/// bcrypt cost for stored passwords
pub const PASSWORD_HASH_COST: u32 = 8;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Email of the user
    pub email: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
}

impl Claims {
    /// Numeric user id carried in `sub`
    pub fn user_id(&self) -> Option<u64> {
        self.sub.parse().ok()
    }
}

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// JWT secret for signing/verifying tokens
    pub jwt_secret: String,
    /// Token expiration time in minutes
    pub token_expiration_minutes: i64,
}

impl AuthConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_expiration_minutes: config.token_expiration_minutes,
        }
    }
}

/// Authentication error
#[derive(Debug)]
pub enum AuthError {
    /// Token is missing
    MissingToken,
    /// Token is invalid
    InvalidToken,
    /// Token is expired
    TokenExpired,
    /// Unknown email or wrong password
    InvalidCredentials,
    /// Some other error
    Other(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::InvalidCredentials => (StatusCode::BAD_REQUEST, "Invalid credentials"),
            AuthError::Other(err) => {
                error!("Auth error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Authenticated caller, inserted into request extensions by [`require_auth`]
#[derive(Debug, Clone)]
pub struct JwtAuth {
    pub claims: Claims,
}

/// Extract the bearer token from the Authorization header
pub fn extract_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let auth_str = auth_header.to_str().map_err(|_| AuthError::InvalidToken)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidToken)?;

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token.to_string())
}

/// Auth service for token operations
pub struct AuthService {
    config: Arc<AuthConfig>,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Get the auth config
    pub fn config(&self) -> Arc<AuthConfig> {
        self.config.clone()
    }

    /// Generate a new JWT token
    pub fn generate_token(&self, user_id: u64, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.config.token_expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Other(format!("Failed to generate token: {}", e)))
    }

    /// Validate a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
        .map_err(|e| {
            debug!("JWT validation error: {:?}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })
    }
}

/// Salted bcrypt hash, computed on the blocking pool
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, PASSWORD_HASH_COST))
        .await
        .map_err(|e| AuthError::Other(format!("Hashing task failed: {}", e)))?
        .map_err(|e| AuthError::Other(format!("Failed to hash password: {}", e)))
}

/// Check a password against a stored hash, on the blocking pool
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Other(format!("Verification task failed: {}", e)))?
        .map_err(|e| AuthError::Other(format!("Failed to verify password: {}", e)))
}

/// Middleware rejecting requests without a valid bearer token
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_token(req.headers())?;
    let claims = state.auth_service.validate_token(&token)?;
    req.extensions_mut().insert(JwtAuth { claims });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn service(minutes: i64) -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_expiration_minutes: minutes,
        })
    }

    #[test]
    fn test_token_round_trip() {
        let auth = service(60);
        let token = auth.generate_token(1, "test@example.com").unwrap();
        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.user_id(), Some(1));
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_expired_token() {
        // Well past the default validation leeway
        let auth = service(-10);
        let token = auth.generate_token(1, "test@example.com").unwrap();
        assert!(matches!(auth.validate_token(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let token = service(60).generate_token(1, "test@example.com").unwrap();
        let other = AuthService::new(AuthConfig {
            jwt_secret: "another-secret".to_string(),
            token_expiration_minutes: 60,
        });
        assert!(matches!(other.validate_token(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_extract_token() {
        let mut headers = HeaderMap::new();
        assert!(matches!(extract_token(&headers), Err(AuthError::MissingToken)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(extract_token(&headers), Err(AuthError::InvalidToken)));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_token(&headers).unwrap(), "abc.def");
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let hash = hash_password("password123".to_string()).await.unwrap();
        assert_ne!(hash, "password123");
        assert!(verify_password("password123".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".to_string(), hash).await.unwrap());
    }
}
