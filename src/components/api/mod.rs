pub mod auth;
pub mod client;
pub mod events;
pub mod models;
pub mod session;

pub use auth::AuthService;
pub use client::ApiClient;
pub use events::{EventApi, EventService};
pub use models::{AuthResponse, LoginCredentials, RegisterCredentials, User};
pub use session::{Session, SessionStore};
