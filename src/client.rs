use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::auth::GoogleAuth;
use crate::error::CalendarError;
use crate::models::event::{EventStatus, RawEvent};

/// Provider page cap for a single `events.list` call.
pub const MAX_RESULTS_PER_PAGE: u32 = 2500;
// Upper bound on pages followed when token following is enabled.
const MAX_PAGES: usize = 20;

/// Events returned for one time window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventList {
    pub events: Vec<RawEvent>,
    /// Set when the provider had more pages that were not requested.
    pub next_page_token: Option<String>,
}

/// Source of calendar occurrences for a time window.
///
/// Implementations must expand recurring events and return occurrences
/// ordered by start time.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<EventList, CalendarError>;
}

// Google Calendar v3 response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    #[serde(default)]
    id: String,
    summary: Option<String>,
    description: Option<String>,
    start: Option<EventDateTime>,
    status: Option<String>,
    organizer: Option<Organizer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDateTime {
    date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Organizer {
    email: Option<String>,
}

impl From<GoogleEvent> for RawEvent {
    fn from(event: GoogleEvent) -> Self {
        let start = event
            .start
            .as_ref()
            .and_then(|s| s.date_time.as_deref())
            .and_then(|dt| match DateTime::parse_from_rfc3339(dt) {
                Ok(parsed) => Some(parsed.with_timezone(&Utc)),
                Err(e) => {
                    warn!("Event {} has an unreadable start '{}': {}", event.id, dt, e);
                    None
                }
            });

        RawEvent {
            id: event.id,
            summary: event.summary,
            description: event.description,
            start,
            status: event
                .status
                .as_deref()
                .map(EventStatus::from)
                .unwrap_or_default(),
            organizer_email: event.organizer.and_then(|o| o.email),
        }
    }
}

/// Client for the Google Calendar `events.list` endpoint.
pub struct GoogleCalendarClient {
    client: Client,
    auth: GoogleAuth,
    endpoint: String,
    calendar_id: String,
    max_results: u32,
    follow_page_tokens: bool,
}

impl GoogleCalendarClient {
    pub fn new(endpoint: &str, calendar_id: &str, auth: GoogleAuth) -> Self {
        Self {
            client: Client::new(),
            auth,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            max_results: MAX_RESULTS_PER_PAGE,
            follow_page_tokens: false,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(1, MAX_RESULTS_PER_PAGE);
        self
    }

    /// Request every page instead of stopping after the first one.
    pub fn with_page_following(mut self, follow: bool) -> Self {
        self.follow_page_tokens = follow;
        self
    }

    fn events_url(&self) -> Result<Url, CalendarError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| CalendarError::Endpoint(format!("{}: {}", self.endpoint, e)))?;

        url.path_segments_mut()
            .map_err(|_| CalendarError::Endpoint(self.endpoint.clone()))?
            .push("calendars")
            .push(&self.calendar_id)
            .push("events");

        Ok(url)
    }

    async fn fetch_page(
        &self,
        url: &Url,
        access_token: &str,
        time_min: &str,
        time_max: &str,
        page_token: Option<&str>,
    ) -> Result<EventsResponse, CalendarError> {
        let max_results = self.max_results.to_string();
        let mut request = self
            .client
            .get(url.clone())
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", time_min),
                ("timeMax", time_max),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", max_results.as_str()),
            ]);

        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        debug!("Requesting calendar events: {} [{} .. {}]", url, time_min, time_max);

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Auth(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.json::<EventsResponse>().await?)
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<EventList, CalendarError> {
        let url = self.events_url()?;
        let access_token = self.auth.access_token().await?;
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = time_max.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self
                .fetch_page(&url, &access_token, &time_min, &time_max, page_token.as_deref())
                .await?;
            pages += 1;

            events.extend(page.items.into_iter().map(RawEvent::from));
            page_token = page.next_page_token;

            if page_token.is_none() || !self.follow_page_tokens || pages >= MAX_PAGES {
                break;
            }
        }

        info!(
            "Retrieved {} calendar events in {} page(s) for {} .. {}",
            events.len(),
            pages,
            time_min,
            time_max
        );

        Ok(EventList {
            events,
            next_page_token: page_token,
        })
    }
}
