//! Google Calendar v3 client for calgate.
//!
//! A [`CalendarClient`] is bound to one user's [`CredentialBundle`] and
//! forwards calendar and event operations to the provider. Caller input is
//! validated before any request leaves the process, and provider failures
//! come back as [`Error::Provider`] carrying the upstream status.
//!
//! # Example
//!
//! ```no_run
//! use calgate_client::{CalendarClient, ListEventsQuery, Result};
//! # use calgate_types::CredentialBundle;
//!
//! # async fn example(bundle: CredentialBundle) -> Result<()> {
//! let client = CalendarClient::builder().credentials(bundle).build()?;
//!
//! for calendar in client.calendars().list().await? {
//!     println!("{}: {}", calendar.id, calendar.summary);
//! }
//!
//! let upcoming = client
//!     .events()
//!     .list("primary", ListEventsQuery::default())
//!     .await?;
//! println!("{} upcoming events", upcoming.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod error;

pub use api::{CalendarsApi, EventsApi, ListEventsQuery};
pub use calgate_types::CredentialBundle;
pub use client::{CalendarClient, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{Error, Result};
