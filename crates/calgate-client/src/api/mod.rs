//! API endpoint implementations.

mod calendars;
mod events;

pub use calendars::CalendarsApi;
pub use events::{EventsApi, ListEventsQuery};

/// Google list envelope: `{"items": [...]}`. `items` is omitted when empty.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Percent-encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
