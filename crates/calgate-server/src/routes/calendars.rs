//! Calendar list endpoint.

use axum::Json;
use calgate_types::Calendar;

use crate::auth::Authorized;
use crate::error::{ErrorResponse, Result};

/// GET /api/calendars - List the user's calendars.
#[utoipa::path(
    get,
    path = "/api/calendars",
    responses(
        (status = 200, description = "Calendars on the user's list", body = Vec<Calendar>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
    ),
    tag = "calendars"
)]
pub async fn list_calendars_handler(Authorized(client): Authorized) -> Result<Json<Vec<Calendar>>> {
    let calendars = client.calendars().list().await?;
    Ok(Json(calendars))
}
