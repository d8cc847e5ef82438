//! API routes.

pub mod auth;
pub mod calendars;
pub mod events;
pub mod extract;
pub mod health;
pub mod openapi;
pub mod root;

pub use auth::{LoginResponse, callback_handler, login_handler};
pub use calendars::list_calendars_handler;
pub use events::{
    create_event_handler, delete_event_handler, list_events_handler, update_event_handler,
};
pub use health::health_routes;
pub use root::root_routes;
