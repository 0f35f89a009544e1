use super::actor::{EventList, EventsQueryActor, EventsQueryActorHandle};
use crate::components::api::EventApi;
use crate::components::calendar::{CalendarEvent, EventDraft, EventPatch};
use crate::error::CalResult;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Read and write access to calendar events through the query cache.
///
/// Reads are served from the cache; successful writes invalidate it.
#[derive(Clone)]
pub struct EventsQueryHandle {
    actor_handle: EventsQueryActorHandle,
    api: Arc<dyn EventApi>,
    _actor_task: Arc<JoinHandle<()>>,
}

impl EventsQueryHandle {
    /// Create a new EventsQueryHandle and spawn the actor
    pub fn new(api: Arc<dyn EventApi>) -> Self {
        let (mut actor, handle) = EventsQueryActor::new(Arc::clone(&api));

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            api,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// The event collection
    pub async fn events(&self) -> CalResult<EventList> {
        self.actor_handle.get_events().await
    }

    /// Force the next read to refetch
    pub async fn invalidate(&self) -> CalResult<()> {
        self.actor_handle.invalidate().await
    }

    /// Validate a draft and create it
    pub async fn create_event(&self, draft: EventDraft) -> CalResult<CalendarEvent> {
        let event = draft.into_new_event()?;
        let created = self.api.create_event(&event).await?;
        self.invalidate().await?;
        Ok(created)
    }

    pub async fn update_event(&self, id: u64, patch: &EventPatch) -> CalResult<CalendarEvent> {
        let updated = self.api.update_event(id, patch).await?;
        self.invalidate().await?;
        Ok(updated)
    }

    pub async fn delete_event(&self, id: u64) -> CalResult<()> {
        self.api.delete_event(id).await?;
        self.invalidate().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalResult<()> {
        self.actor_handle.shutdown().await
    }
}
