//! Calendar projection.

use serde::{Deserialize, Serialize};

/// A calendar visible to the authenticated user.
///
/// Read-only projection of a Google `calendarList` entry. Fields the
/// provider sends beyond these are dropped on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Calendar {
    /// Provider calendar identifier (an email-like string, or `primary`).
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub summary: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether this is the user's primary calendar.
    #[serde(default)]
    pub primary: Option<bool>,
}
