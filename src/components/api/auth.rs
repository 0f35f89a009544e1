use super::client::ApiClient;
use super::models::{AuthResponse, LoginCredentials, RegisterCredentials, User};
use super::session::Session;
use crate::error::{validation_error, CalResult};
use tracing::info;

/// Sign-in flows against the API, keeping the stored session in step
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Log in and persist the returned session
    pub async fn login(&self, credentials: &LoginCredentials) -> CalResult<AuthResponse> {
        let response: AuthResponse = self.client.post("/auth/login", credentials).await?;
        self.persist(&response)?;
        info!("Logged in as {}", response.user.email);
        Ok(response)
    }

    /// Create an account and persist the returned session
    pub async fn register(&self, credentials: &RegisterCredentials) -> CalResult<AuthResponse> {
        if credentials.password != credentials.confirm_password {
            return Err(validation_error("Passwords do not match"));
        }
        let response: AuthResponse = self.client.post("/auth/register", credentials).await?;
        self.persist(&response)?;
        info!("Registered {}", response.user.email);
        Ok(response)
    }

    /// Forget the local session; the server keeps no session state
    pub fn logout(&self) -> CalResult<()> {
        self.client.session().clear()
    }

    /// Fetch the signed-in user and refresh the stored copy
    pub async fn current_user(&self) -> CalResult<User> {
        let user: User = self.client.get("/auth/me").await?;
        self.client.session().set_user(user.clone())?;
        Ok(user)
    }

    /// The stored session, if signed in
    pub fn session(&self) -> Option<Session> {
        self.client
            .session()
            .load()
            .filter(|session| session.token.is_some())
    }

    fn persist(&self, response: &AuthResponse) -> CalResult<()> {
        self.client.session().save(&Session {
            user: Some(response.user.clone()),
            token: Some(response.token.clone()),
        })
    }
}
