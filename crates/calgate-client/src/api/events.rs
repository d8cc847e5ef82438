//! Events API.

use calgate_types::error::require_non_blank;
use calgate_types::{Event, EventInput, ValidationError};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::Serialize;

use super::{ListResponse, segment};
use crate::client::CalendarClient;
use crate::error::Result;

/// Upper bound Google accepts for `maxResults`.
pub const MAX_RESULTS_LIMIT: u32 = 2500;

/// Query parameters for listing events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEventsQuery {
    /// Maximum number of events to return (1..=2500).
    pub max_results: u32,
    /// Only events ending after this instant.
    pub time_min: Option<DateTime<FixedOffset>>,
}

impl Default for ListEventsQuery {
    fn default() -> Self {
        Self {
            max_results: 10,
            time_min: None,
        }
    }
}

impl ListEventsQuery {
    fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            return Err(ValidationError::new(
                "max_results",
                format!("must be between 1 and {MAX_RESULTS_LIMIT}"),
            ));
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireQuery {
    max_results: u32,
    single_events: bool,
    order_by: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_min: Option<String>,
}

/// Events API client.
pub struct EventsApi {
    client: CalendarClient,
}

impl EventsApi {
    pub(crate) fn new(client: CalendarClient) -> Self {
        Self { client }
    }

    fn collection(calendar_id: &str) -> std::result::Result<String, ValidationError> {
        require_non_blank("calendar_id", calendar_id)?;
        Ok(format!("calendars/{}/events", segment(calendar_id)))
    }

    fn item(calendar_id: &str, event_id: &str) -> std::result::Result<String, ValidationError> {
        let collection = Self::collection(calendar_id)?;
        require_non_blank("event_id", event_id)?;
        Ok(format!("{}/{}", collection, segment(event_id)))
    }

    /// List upcoming events in start-time order, recurring events expanded.
    pub async fn list(&self, calendar_id: &str, query: ListEventsQuery) -> Result<Vec<Event>> {
        let path = Self::collection(calendar_id)?;
        query.validate()?;

        let wire = WireQuery {
            max_results: query.max_results,
            single_events: true,
            order_by: "startTime",
            time_min: query
                .time_min
                .map(|t| t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        };
        let response: ListResponse<Event> = self.client.get_with_query(&path, &wire).await?;
        Ok(response.items)
    }

    /// Create an event.
    pub async fn create(&self, calendar_id: &str, input: &EventInput) -> Result<Event> {
        let path = Self::collection(calendar_id)?;
        input.validate()?;
        self.client.post(&path, input).await
    }

    /// Replace an event.
    pub async fn update(&self, calendar_id: &str, event_id: &str, input: &EventInput) -> Result<Event> {
        let path = Self::item(calendar_id, event_id)?;
        input.validate()?;
        self.client.put(&path, input).await
    }

    /// Delete an event.
    pub async fn delete(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let path = Self::item(calendar_id, event_id)?;
        self.client.delete(&path).await
    }
}
