//! Calendar list API.

use calgate_types::Calendar;

use super::ListResponse;
use crate::client::CalendarClient;
use crate::error::Result;

/// Calendar list API client.
pub struct CalendarsApi {
    client: CalendarClient,
}

impl CalendarsApi {
    pub(crate) fn new(client: CalendarClient) -> Self {
        Self { client }
    }

    /// List the calendars on the user's calendar list.
    pub async fn list(&self) -> Result<Vec<Calendar>> {
        let response: ListResponse<Calendar> = self.client.get("users/me/calendarList").await?;
        Ok(response.items)
    }
}
