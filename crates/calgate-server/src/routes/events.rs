//! Event endpoints.

use axum::{Json, extract::Path, http::StatusCode};
use calgate_client::ListEventsQuery;
use calgate_types::{Event, EventInput};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::Authorized;
use crate::error::{ErrorResponse, Result};
use crate::routes::extract::{ApiJson, ApiQuery};

/// Query parameters for listing events.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListEventsParams {
    /// Maximum number of events to return (1-2500, default 10).
    pub max_results: Option<u32>,
    /// Only events ending after this RFC 3339 instant, e.g.
    /// `2025-03-01T00:00:00Z`. A `+` in the offset must be sent as `%2B`.
    #[param(value_type = Option<String>, example = "2025-03-01T00:00:00Z")]
    pub time_min: Option<DateTime<FixedOffset>>,
}

impl From<ListEventsParams> for ListEventsQuery {
    fn from(params: ListEventsParams) -> Self {
        let defaults = ListEventsQuery::default();
        Self {
            max_results: params.max_results.unwrap_or(defaults.max_results),
            time_min: params.time_min,
        }
    }
}

/// GET /api/calendars/{calendar_id}/events - List upcoming events.
#[utoipa::path(
    get,
    path = "/api/calendars/{calendar_id}/events",
    params(
        ("calendar_id" = String, Path, description = "Calendar ID, or `primary`"),
        ListEventsParams,
    ),
    responses(
        (status = 200, description = "Events in start-time order", body = Vec<Event>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 422, description = "Invalid query", body = ErrorResponse),
    ),
    tag = "events"
)]
pub async fn list_events_handler(
    Authorized(client): Authorized,
    Path(calendar_id): Path<String>,
    ApiQuery(params): ApiQuery<ListEventsParams>,
) -> Result<Json<Vec<Event>>> {
    let events = client.events().list(&calendar_id, params.into()).await?;
    Ok(Json(events))
}

/// POST /api/calendars/{calendar_id}/events - Create an event.
#[utoipa::path(
    post,
    path = "/api/calendars/{calendar_id}/events",
    params(("calendar_id" = String, Path, description = "Calendar ID, or `primary`")),
    request_body = EventInput,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 400, description = "Malformed JSON", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 422, description = "Invalid event", body = ErrorResponse),
    ),
    tag = "events"
)]
pub async fn create_event_handler(
    Authorized(client): Authorized,
    Path(calendar_id): Path<String>,
    ApiJson(input): ApiJson<EventInput>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = client.events().create(&calendar_id, &input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/calendars/{calendar_id}/events/{event_id} - Replace an event.
#[utoipa::path(
    put,
    path = "/api/calendars/{calendar_id}/events/{event_id}",
    params(
        ("calendar_id" = String, Path, description = "Calendar ID, or `primary`"),
        ("event_id" = String, Path, description = "Event ID"),
    ),
    request_body = EventInput,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, description = "Malformed JSON", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "No such event", body = ErrorResponse),
        (status = 422, description = "Invalid event", body = ErrorResponse),
    ),
    tag = "events"
)]
pub async fn update_event_handler(
    Authorized(client): Authorized,
    Path((calendar_id, event_id)): Path<(String, String)>,
    ApiJson(input): ApiJson<EventInput>,
) -> Result<Json<Event>> {
    let event = client
        .events()
        .update(&calendar_id, &event_id, &input)
        .await?;
    Ok(Json(event))
}

/// DELETE /api/calendars/{calendar_id}/events/{event_id} - Delete an event.
#[utoipa::path(
    delete,
    path = "/api/calendars/{calendar_id}/events/{event_id}",
    params(
        ("calendar_id" = String, Path, description = "Calendar ID, or `primary`"),
        ("event_id" = String, Path, description = "Event ID"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 404, description = "No such event", body = ErrorResponse),
    ),
    tag = "events"
)]
pub async fn delete_event_handler(
    Authorized(client): Authorized,
    Path((calendar_id, event_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    client.events().delete(&calendar_id, &event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_default_to_ten() {
        let query: ListEventsQuery = ListEventsParams::default().into();
        assert_eq!(query.max_results, 10);
        assert!(query.time_min.is_none());
    }

    #[test]
    fn test_params_carry_time_min() {
        let params: ListEventsParams =
            serde_json::from_value(serde_json::json!({ "max_results": 3, "time_min": "2025-01-01T00:00:00Z" }))
                .unwrap();
        let query: ListEventsQuery = params.into();
        assert_eq!(query.max_results, 3);
        assert_eq!(
            query.time_min.unwrap().to_rfc3339(),
            "2025-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_time_min_offset_must_be_percent_encoded() {
        use axum::{extract::Query, http::Uri};

        let uri: Uri = "/events?time_min=2025-03-01T09:00:00%2B01:00".parse().unwrap();
        let Query(params) = Query::<ListEventsParams>::try_from_uri(&uri).unwrap();
        assert_eq!(params.time_min.unwrap().offset().local_minus_utc(), 3600);

        // A bare `+` decodes to a space.
        let uri: Uri = "/events?time_min=2025-03-01T09:00:00+01:00".parse().unwrap();
        assert!(Query::<ListEventsParams>::try_from_uri(&uri).is_err());
    }
}
