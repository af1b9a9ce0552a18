use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::client::CalendarProvider;
use crate::error::CalendarError;
use crate::models::dashboard::FetchStatus;
use crate::models::event::RawEvent;

/// Events for one window together with how complete they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub events: Vec<RawEvent>,
    pub status: FetchStatus,
}

/// Pulls calendar occurrences and never fails.
///
/// Provider errors and timeouts are logged and turned into an empty list
/// with a `Failed` status so the dashboard can still render.
pub struct EventFetcher {
    provider: Arc<dyn CalendarProvider>,
    timeout: Duration,
}

impl EventFetcher {
    pub fn new(provider: Arc<dyn CalendarProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub async fn fetch(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> FetchOutcome {
        let result = match timeout(self.timeout, self.provider.list_events(start, end)).await {
            Ok(result) => result,
            Err(_) => Err(CalendarError::Timeout(self.timeout)),
        };

        match result {
            Ok(list) => {
                let status = match list.next_page_token {
                    Some(token) => {
                        warn!(
                            "Calendar returned more events than one page for {} .. {} (next page token {}); later pages were not read",
                            start, end, token
                        );
                        FetchStatus::Partial
                    }
                    None => FetchStatus::Complete,
                };

                info!("Fetched {} events for {} .. {}", list.events.len(), start, end);
                FetchOutcome {
                    events: list.events,
                    status,
                }
            }
            Err(e) => {
                warn!("Failed to fetch calendar events, continuing with none: {}", e);
                FetchOutcome {
                    events: Vec::new(),
                    status: FetchStatus::Failed(e.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;

    use crate::client::EventList;
    use crate::client_mock::{setup_failing_client, setup_mock_client, MockCalendarClient};

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        )
    }

    fn event(id: &str) -> RawEvent {
        RawEvent {
            id: id.to_string(),
            summary: Some("Manucure entre Effynails et Jane".to_string()),
            ..Default::default()
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl CalendarProvider for SlowProvider {
        async fn list_events(
            &self,
            _time_min: DateTime<Utc>,
            _time_max: DateTime<Utc>,
        ) -> Result<EventList, CalendarError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(EventList::default())
        }
    }

    #[tokio::test]
    async fn test_fetch_passes_window_and_returns_events() {
        let (start, end) = window();
        let mut mock = MockCalendarClient::new();
        mock.expect_list_events()
            .withf(move |time_min, time_max| *time_min == start && *time_max == end)
            .times(1)
            .returning(|_, _| {
                Ok(EventList {
                    events: vec![event("a"), event("b")],
                    next_page_token: None,
                })
            });

        let fetcher = EventFetcher::new(Arc::new(mock), Duration::from_secs(1));
        let outcome = fetcher.fetch(start, end).await;

        assert_eq!(outcome.events.len(), 2);
        assert_eq!(outcome.status, FetchStatus::Complete);
    }

    #[tokio::test]
    async fn test_remaining_page_marks_outcome_partial() {
        let mut mock = MockCalendarClient::new();
        mock.expect_list_events().returning(|_, _| {
            Ok(EventList {
                events: vec![event("a")],
                next_page_token: Some("page-2".to_string()),
            })
        });

        let (start, end) = window();
        let outcome = EventFetcher::new(Arc::new(mock), Duration::from_secs(1))
            .fetch(start, end)
            .await;

        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.status, FetchStatus::Partial);
    }

    #[tokio::test]
    async fn test_provider_error_yields_empty_list() {
        let (start, end) = window();
        let outcome = EventFetcher::new(Arc::new(setup_failing_client(429)), Duration::from_secs(1))
            .fetch(start, end)
            .await;

        assert!(outcome.events.is_empty());
        assert!(matches!(outcome.status, FetchStatus::Failed(_)));
        assert_eq!(outcome.status.label(), "degraded");
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_list() {
        let (start, end) = window();
        let outcome = EventFetcher::new(Arc::new(SlowProvider), Duration::from_millis(20))
            .fetch(start, end)
            .await;

        assert!(outcome.events.is_empty());
        match outcome.status {
            FetchStatus::Failed(reason) => assert!(reason.contains("timed out")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_calendar_is_complete() {
        let (start, end) = window();
        let outcome = EventFetcher::new(Arc::new(setup_mock_client(Vec::new())), Duration::from_secs(1))
            .fetch(start, end)
            .await;

        assert!(outcome.events.is_empty());
        assert_eq!(outcome.status, FetchStatus::Complete);
    }
}
