use crate::components::api::EventApi;
use crate::components::calendar::CalendarEvent;
use crate::error::{query_error, CalResult};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Shared, immutable snapshot of the event collection
pub type EventList = Arc<Vec<CalendarEvent>>;

/// The events query actor: owns the cached collection and the in-flight fetch
pub struct EventsQueryActor {
    api: Arc<dyn EventApi>,
    command_rx: mpsc::Receiver<EventsQueryCommand>,
    // Weak so that dropping every handle still closes the mailbox
    command_tx: mpsc::WeakSender<EventsQueryCommand>,
    cached: Option<EventList>,
    in_flight: bool,
    waiters: Vec<mpsc::Sender<EventList>>,
    generation: u64,
}

/// Commands that can be sent to the events query actor
pub enum EventsQueryCommand {
    GetEvents(mpsc::Sender<EventList>),
    Invalidate,
    FetchCompleted {
        generation: u64,
        events: Vec<CalendarEvent>,
    },
    Shutdown,
}

/// Handle for communicating with the events query actor
#[derive(Clone)]
pub struct EventsQueryActorHandle {
    command_tx: mpsc::Sender<EventsQueryCommand>,
}

impl EventsQueryActorHandle {
    /// Cached events, fetching them first when the cache is empty
    pub async fn get_events(&self) -> CalResult<EventList> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(EventsQueryCommand::GetEvents(response_tx))
            .await
            .map_err(|e| query_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| query_error("Response channel closed"))
    }

    /// Drop the cached collection so the next read refetches
    pub async fn invalidate(&self) -> CalResult<()> {
        self.command_tx
            .send(EventsQueryCommand::Invalidate)
            .await
            .map_err(|e| query_error(&format!("Actor mailbox error: {}", e)))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalResult<()> {
        let _ = self.command_tx.send(EventsQueryCommand::Shutdown).await;
        Ok(())
    }
}

impl EventsQueryActor {
    /// Create a new actor and return its handle
    pub fn new(api: Arc<dyn EventApi>) -> (Self, EventsQueryActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            api,
            command_rx,
            command_tx: command_tx.downgrade(),
            cached: None,
            in_flight: false,
            waiters: Vec::new(),
            generation: 0,
        };

        (actor, EventsQueryActorHandle { command_tx })
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Events query actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                EventsQueryCommand::GetEvents(response_tx) => {
                    if let Some(events) = &self.cached {
                        let _ = response_tx.send(Arc::clone(events)).await;
                    } else {
                        self.waiters.push(response_tx);
                        if !self.in_flight {
                            self.start_fetch();
                        }
                    }
                }
                EventsQueryCommand::Invalidate => {
                    debug!("Invalidating cached events");
                    self.generation += 1;
                    self.cached = None;
                }
                EventsQueryCommand::FetchCompleted { generation, events } => {
                    self.finish_fetch(generation, events).await;
                }
                EventsQueryCommand::Shutdown => {
                    info!("Events query actor shutting down");
                    break;
                }
            }
        }

        info!("Events query actor shut down");
    }

    /// Fetch in the background; the result comes back through the mailbox
    fn start_fetch(&mut self) {
        self.in_flight = true;
        let api = Arc::clone(&self.api);
        let generation = self.generation;
        let command_tx = self.command_tx.clone();

        debug!("Fetching events (generation {})", generation);
        tokio::spawn(async move {
            let events = api.fetch_events().await;
            if let Some(command_tx) = command_tx.upgrade() {
                let _ = command_tx
                    .send(EventsQueryCommand::FetchCompleted { generation, events })
                    .await;
            }
        });
    }

    async fn finish_fetch(&mut self, generation: u64, events: Vec<CalendarEvent>) {
        self.in_flight = false;

        // Invalidated while in flight: the result may predate a mutation
        if generation != self.generation {
            debug!("Discarding stale fetch (generation {})", generation);
            if !self.waiters.is_empty() {
                self.start_fetch();
            }
            return;
        }

        let events = Arc::new(events);
        self.cached = Some(Arc::clone(&events));
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(Arc::clone(&events)).await;
        }
    }
}
