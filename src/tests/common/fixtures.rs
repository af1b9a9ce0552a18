use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use crate::models::event::{EventStatus, RawEvent};
use crate::models::tariff::TariffEntry;
use crate::services::parser::AppointmentParser;

pub const TIMEZONE: Tz = chrono_tz::Europe::Brussels;

/// Parser configured like the salon's production calendar
pub fn salon_parser() -> AppointmentParser {
    AppointmentParser::new("Effynails", "Andy", TIMEZONE).unwrap()
}

/// Local wall-clock time in the salon's timezone
pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Tz> {
    TIMEZONE
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

/// UTC instant for a local wall-clock time
pub fn local_utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    local(year, month, day, hour, minute).with_timezone(&Utc)
}

/// A booking made through the salon's booking page
pub fn booking(id: &str, service: &str, client: &str, start: Option<DateTime<Utc>>) -> RawEvent {
    RawEvent {
        id: id.to_string(),
        summary: Some(format!("{} entre Effynails et {}", service, client)),
        description: Some(format!(
            "Réservé par\nAndy\n{}@example.com\n\nVotre numéro de téléphone: +32 470 00 00 00\n\nBesoin de replanifier ou d'annuler ? https://calendar.app.google/{}\n",
            client.to_lowercase().replace(' ', "."),
            id
        )),
        start,
        status: EventStatus::Confirmed,
        organizer_email: Some("andy@effynails.be".to_string()),
    }
}

/// An event from another activity sharing the calendar
pub fn unrelated(id: &str, summary: &str, start: Option<DateTime<Utc>>) -> RawEvent {
    RawEvent {
        id: id.to_string(),
        summary: Some(summary.to_string()),
        start,
        ..Default::default()
    }
}

pub fn tariff(id: u64, nom: &str, cents: i64, duree: u32) -> TariffEntry {
    TariffEntry {
        id,
        nom: nom.to_string(),
        prix: Decimal::new(cents, 2),
        duree,
        description: None,
    }
}

/// The salon's default price list, keyed by name
pub fn default_tariffs() -> HashMap<String, TariffEntry> {
    [
        tariff(1, "Manucure simple", 2500, 30),
        tariff(2, "Pose de gel", 4000, 60),
        tariff(3, "Pédicure complète", 3500, 45),
    ]
    .into_iter()
    .map(|t| (t.nom.clone(), t))
    .collect()
}
