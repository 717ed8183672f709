//! Calendar API.

use crate::client::LyceumClient;
use crate::error::Result;
use crate::types::{CalendarEvent, CreateEventRequest, UpdateEventRequest};

/// Query parameters for listing events.
#[derive(Debug, Default, serde::Serialize)]
pub struct ListEventsQuery {
    /// Only events that have not started yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming: Option<bool>,
    /// Maximum number of events to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Calendar API client.
pub struct CalendarApi {
    client: LyceumClient,
}

impl CalendarApi {
    pub(crate) fn new(client: LyceumClient) -> Self {
        Self { client }
    }

    /// List all events.
    pub async fn list(&self) -> Result<Vec<CalendarEvent>> {
        self.client.get("api/events").await
    }

    /// List events with query parameters.
    pub async fn list_with_query(&self, query: ListEventsQuery) -> Result<Vec<CalendarEvent>> {
        self.client.get_with_query("api/events", &query).await
    }

    /// List events that have not started yet.
    pub async fn upcoming(&self) -> Result<Vec<CalendarEvent>> {
        self.list_with_query(ListEventsQuery {
            upcoming: Some(true),
            ..Default::default()
        })
        .await
    }

    /// Get an event by ID.
    pub async fn get(&self, id: &str) -> Result<CalendarEvent> {
        self.client.get(&format!("api/events/{}", id)).await
    }

    /// Create an event.
    pub async fn create(&self, request: CreateEventRequest) -> Result<CalendarEvent> {
        self.client.post("api/events", &request).await
    }

    /// Update an event.
    pub async fn update(&self, id: &str, request: UpdateEventRequest) -> Result<CalendarEvent> {
        self.client.put(&format!("api/events/{}", id), &request).await
    }

    /// Delete an event.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("api/events/{}", id)).await
    }
}
