use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event status as reported by the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventStatus {
    #[default]
    Confirmed,
    Tentative,
    Cancelled,
    Other(String),
}

impl EventStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EventStatus::Confirmed => "confirmed",
            EventStatus::Tentative => "tentative",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Other(status) => status,
        }
    }
}

impl From<&str> for EventStatus {
    fn from(value: &str) -> Self {
        match value {
            "confirmed" => EventStatus::Confirmed,
            "tentative" => EventStatus::Tentative,
            "cancelled" => EventStatus::Cancelled,
            other => EventStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for EventStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(EventStatus::from(value.as_str()))
    }
}

/// A single calendar occurrence as returned by the provider.
///
/// Recurring events are already expanded. `start` is only set when the
/// provider gave a concrete date-time, so all-day events are left out of
/// every time-bucketed view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub status: EventStatus,
    pub organizer_email: Option<String>,
}

impl RawEvent {
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }
}
