// Export components
pub mod api;
pub mod calendar;
pub mod query;

// Re-export the handles the front end works with
pub use api::{ApiClient, AuthService, EventService, SessionStore};
pub use query::EventsQueryHandle;
