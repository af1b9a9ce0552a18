use std::borrow::Cow;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;

use crate::models::appointment::ParsedAppointment;
use crate::models::event::RawEvent;

pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";

// Compile-once patterns for the fixed booking-form labels.
fn re_phone() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Votre numéro de téléphone:\s*(\+?[0-9][0-9 \t]*)")
            .expect("phone regex should compile")
    })
}

fn re_note() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Notes supplémentaires:\s*(.*?)\n\n").expect("note regex should compile")
    })
}

fn re_cancellation_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Besoin de replanifier ou d'annuler \?\s*(https?://\S+)")
            .expect("cancellation url regex should compile")
    })
}

/// Booking tools may send CRLF line endings; the patterns expect `\n`.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Phone number following the booking form's phone label.
pub fn extract_phone(description: &str) -> Option<String> {
    let description = normalize_newlines(description);
    re_phone()
        .captures(&description)
        .map(|caps| caps[1].trim().to_string())
}

/// Free-text note, up to the next blank line. May span several lines.
pub fn extract_note(description: &str) -> Option<String> {
    let description = normalize_newlines(description);
    re_note()
        .captures(&description)
        .map(|caps| caps[1].trim().to_string())
        .filter(|note| !note.is_empty())
}

pub fn extract_cancellation_url(description: &str) -> Option<String> {
    let description = normalize_newlines(description);
    re_cancellation_url()
        .captures(&description)
        .map(|caps| caps[1].to_string())
}

/// `DD/MM/YYYY HH:mm` in the salon's timezone, or empty without a start.
pub fn format_start(start: Option<DateTime<Utc>>, tz: Tz) -> String {
    match start {
        Some(start) => start.with_timezone(&tz).format(DATE_FORMAT).to_string(),
        None => String::new(),
    }
}

/// Extracts booking details from event titles and descriptions.
///
/// The title and email patterns depend on configuration (business name,
/// email label) so they are built once per parser. Parsing never fails:
/// anything that does not match is left empty.
#[derive(Debug, Clone)]
pub struct AppointmentParser {
    title_re: Regex,
    email_re: Regex,
    timezone: Tz,
}

impl AppointmentParser {
    pub fn new(business_name: &str, email_label: &str, timezone: Tz) -> Result<Self, regex::Error> {
        let title_re = Regex::new(&format!(
            r"(?i)^(.*?) entre {} et (.*)$",
            regex::escape(business_name)
        ))?;
        let email_re = Regex::new(&format!(
            r"(?i){}\s*\n([\w.%-]+@[\w.-]+\.[A-Za-z]{{2,6}})",
            regex::escape(email_label)
        ))?;

        Ok(Self {
            title_re,
            email_re,
            timezone,
        })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Split `<service> entre <business> et <client>` into its two parts.
    ///
    /// Titles in any other shape are returned whole as the service with an
    /// empty client name.
    pub fn split_title(&self, title: &str) -> (String, String) {
        match self.title_re.captures(title) {
            Some(caps) => (caps[1].trim().to_string(), caps[2].trim().to_string()),
            None => (title.to_string(), String::new()),
        }
    }

    pub fn service_type(&self, title: &str) -> String {
        self.split_title(title).0
    }

    pub fn extract_email(&self, description: &str) -> Option<String> {
        let description = normalize_newlines(description);
        self.email_re
            .captures(&description)
            .map(|caps| caps[1].to_string())
    }

    pub fn parse(&self, event: &RawEvent) -> ParsedAppointment {
        let (service_type, client_name) = self.split_title(event.title());
        let description = event.description.as_deref().unwrap_or("");

        ParsedAppointment {
            id: event.id.clone(),
            service_type,
            client_name,
            formatted_date: format_start(event.start, self.timezone),
            status: event.status.clone(),
            note: extract_note(description),
            client_email: self.extract_email(description),
            client_phone: extract_phone(description),
            cancellation_url: extract_cancellation_url(description),
        }
    }
}
