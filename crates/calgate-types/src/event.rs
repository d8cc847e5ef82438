//! Event shapes: the provider projection and the create/update input.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError, require_non_blank};

/// A `dateTime` value: either an RFC 3339 instant or a local wall-clock time.
///
/// A local time is only meaningful together with `timeZone`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum EventDateTime {
    /// `2025-03-10T09:00:00+01:00`
    Zoned(DateTime<FixedOffset>),
    /// `2025-03-10T09:00:00`, interpreted in the boundary's `timeZone`.
    Local(NaiveDateTime),
}

impl From<DateTime<FixedOffset>> for EventDateTime {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::Zoned(value)
    }
}

impl From<NaiveDateTime> for EventDateTime {
    fn from(value: NaiveDateTime) -> Self {
        Self::Local(value)
    }
}

/// Start or end of an event, in Google's wire shape.
///
/// All-day events carry `date`; timed events carry `dateTime`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<EventDateTime>,
    /// IANA time zone name, e.g. `Europe/Paris`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// An all-day boundary.
    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    /// A timed boundary.
    pub fn at(date_time: impl Into<EventDateTime>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            ..Default::default()
        }
    }

    /// Set the time zone.
    pub fn with_time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = Some(tz.into());
        self
    }

    /// Whether neither `date` nor `dateTime` is set.
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.date_time.is_none()
    }

    fn validate(&self, field: &str) -> Result<()> {
        match (&self.date, &self.date_time) {
            (None, None) => Err(ValidationError::new(
                field,
                "one of `date` or `dateTime` is required",
            )),
            (Some(_), Some(_)) => Err(ValidationError::new(
                field,
                "`date` and `dateTime` are mutually exclusive",
            )),
            (None, Some(EventDateTime::Local(_))) if self.time_zone.is_none() => {
                Err(ValidationError::new(
                    field,
                    "`dateTime` without a UTC offset requires `timeZone`",
                ))
            }
            _ => Ok(()),
        }
    }
}

/// An event attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
    /// `needsAction`, `declined`, `tentative` or `accepted`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            optional: None,
            response_status: None,
        }
    }
}

/// An event as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    #[serde(default)]
    pub attendees: Option<Vec<Attendee>>,
    /// Link to the event in the provider's web UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    /// `confirmed`, `tentative` or `cancelled`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body for creating or replacing an event. Carries no `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
}

impl EventInput {
    /// Create an input with the required fields set.
    pub fn new(summary: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Self {
            summary: summary.into(),
            start,
            end,
            ..Default::default()
        }
    }

    /// Whether nothing meaningful was supplied.
    pub fn is_empty(&self) -> bool {
        self.summary.trim().is_empty()
            && self.start.is_empty()
            && self.end.is_empty()
            && self.location.is_none()
            && self.description.is_none()
            && self.attendees.as_ref().is_none_or(|a| a.is_empty())
    }

    /// Check field presence before the input is sent anywhere.
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ValidationError::new("event", "event data is required"));
        }
        require_non_blank("summary", &self.summary)?;
        self.start.validate("start")?;
        self.end.validate("end")?;
        if let Some(attendees) = &self.attendees {
            for (i, attendee) in attendees.iter().enumerate() {
                require_non_blank(&format!("attendees[{i}].email"), &attendee.email)?;
            }
        }
        Ok(())
    }
}
