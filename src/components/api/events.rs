use super::client::ApiClient;
use crate::components::calendar::{CalendarEvent, EventPatch, NewCalendarEvent};
use crate::error::CalResult;
use async_trait::async_trait;
use tracing::{error, info};

/// Remote operations on calendar events
#[async_trait]
pub trait EventApi: Send + Sync + 'static {
    /// All events; failures are logged and read as an empty list
    async fn fetch_events(&self) -> Vec<CalendarEvent>;

    async fn create_event(&self, event: &NewCalendarEvent) -> CalResult<CalendarEvent>;

    async fn update_event(&self, id: u64, patch: &EventPatch) -> CalResult<CalendarEvent>;

    async fn delete_event(&self, id: u64) -> CalResult<()>;
}

/// Event CRUD over the REST API
#[derive(Debug, Clone)]
pub struct EventService {
    client: ApiClient,
}

impl EventService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All events, surfacing failures
    pub async fn try_fetch_events(&self) -> CalResult<Vec<CalendarEvent>> {
        self.client.get("/events").await
    }
}

#[async_trait]
impl EventApi for EventService {
    async fn fetch_events(&self) -> Vec<CalendarEvent> {
        match self.try_fetch_events().await {
            Ok(events) => events,
            Err(e) => {
                error!("Error fetching events: {}", e);
                Vec::new()
            }
        }
    }

    async fn create_event(&self, event: &NewCalendarEvent) -> CalResult<CalendarEvent> {
        let created: CalendarEvent = self.client.post("/events", event).await?;
        info!("Created event {} ({})", created.id, created.title);
        Ok(created)
    }

    async fn update_event(&self, id: u64, patch: &EventPatch) -> CalResult<CalendarEvent> {
        let updated: CalendarEvent = self.client.put(&format!("/events/{}", id), patch).await?;
        info!("Updated event {}", id);
        Ok(updated)
    }

    async fn delete_event(&self, id: u64) -> CalResult<()> {
        self.client.delete(&format!("/events/{}", id)).await?;
        info!("Deleted event {}", id);
        Ok(())
    }
}
