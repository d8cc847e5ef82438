//! Shared types for the calgate calendar gateway.
//!
//! These are the typed shapes that flow between the HTTP surface, the
//! Google Calendar adapter and the OAuth flow. Provider payloads are
//! projected onto explicit structs and validated at the boundary.

pub mod calendar;
pub mod credentials;
pub mod error;
pub mod event;

pub use calendar::Calendar;
pub use credentials::CredentialBundle;
pub use error::{Result, ValidationError};
pub use event::{Attendee, Event, EventDateTime, EventInput, EventTime};
