//! OpenAPI documentation configuration.

use calgate_types::{Attendee, Calendar, Event, EventDateTime, EventInput, EventTime};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{auth, calendars, events, health, root};
use crate::error::ErrorResponse;

/// OpenAPI documentation for the calgate API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "calgate API",
        description = "Google Calendar gateway: OAuth login plus calendar and event passthrough",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Local server"),
    ),
    paths(
        root::root,
        health::health,
        auth::login_handler,
        auth::callback_handler,
        calendars::list_calendars_handler,
        events::list_events_handler,
        events::create_event_handler,
        events::update_event_handler,
        events::delete_event_handler,
    ),
    components(
        schemas(
            root::RootResponse,
            health::HealthResponse,
            auth::LoginResponse,
            ErrorResponse,
            Calendar,
            Event,
            EventInput,
            EventTime,
            EventDateTime,
            Attendee,
        )
    ),
    tags(
        (name = "health", description = "Liveness endpoints"),
        (name = "auth", description = "Google OAuth login"),
        (name = "calendars", description = "Calendar list"),
        (name = "events", description = "Event management"),
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi())
}
