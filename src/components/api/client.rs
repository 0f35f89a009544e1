use super::models::ErrorBody;
use super::session::SessionStore;
use crate::config::Config;
use crate::error::{CalResult, Error};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};
use url::Url;

/// HTTP client for the calendar API.
///
/// Every request carries the stored bearer token, read at send time. A 401
/// response clears the stored session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(mut base_url: Url, session: SessionStore) -> Self {
        // Joining relative paths needs a trailing slash on the base
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            client: Client::new(),
            base_url,
            session,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_base_url.clone(),
            SessionStore::new(&config.session_dir),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, path: &str) -> CalResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> CalResult<RequestBuilder> {
        let url = self.url(path)?;
        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn send(&self, request: RequestBuilder) -> CalResult<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("API rejected the session, clearing stored credentials");
            if let Err(e) = self.session.clear() {
                error!("Failed to clear session: {}", e);
            }
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("Request failed").to_string();
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => fallback,
            };
            error!("API error: {} {}", status, message);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> CalResult<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        Ok(response.json().await?)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> CalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::POST, path)?.json(body))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> CalResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.request(Method::PUT, path)?.json(body))
            .await?;
        Ok(response.json().await?)
    }

    pub async fn delete(&self, path: &str) -> CalResult<()> {
        self.send(self.request(Method::DELETE, path)?).await?;
        Ok(())
    }
}
