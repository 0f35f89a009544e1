pub mod draft;
pub mod filter;
pub mod models;
pub mod state;

pub use draft::EventDraft;
pub use models::{CalendarEvent, EventColor, EventPatch, NewCalendarEvent};
pub use state::{CalendarView, ViewState};
