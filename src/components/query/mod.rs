//! Cached view of the remote event collection.

mod actor;
mod handle;

pub use actor::EventList;
pub use handle::EventsQueryHandle;
