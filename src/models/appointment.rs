use serde::{Deserialize, Serialize};

use super::event::EventStatus;

/// Booking details extracted from one calendar event.
///
/// Field names on the wire follow the dashboard front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedAppointment {
    pub id: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(rename = "client")]
    pub client_name: String,
    #[serde(rename = "date")]
    pub formatted_date: String,
    #[serde(rename = "statut")]
    pub status: EventStatus,
    #[serde(rename = "message")]
    pub note: Option<String>,
    #[serde(rename = "email")]
    pub client_email: Option<String>,
    #[serde(rename = "telephone")]
    pub client_phone: Option<String>,
    #[serde(rename = "annulation_url")]
    pub cancellation_url: Option<String>,
}
