use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;

use crate::client::{CalendarProvider, EventList};
use crate::error::CalendarError;
use crate::models::event::RawEvent;

// Define a mock client for the calendar provider
mock! {
    pub CalendarClient {}

    #[async_trait]
    impl CalendarProvider for CalendarClient {
        async fn list_events(
            &self,
            time_min: DateTime<Utc>,
            time_max: DateTime<Utc>,
        ) -> Result<EventList, CalendarError>;
    }
}

// Mock client that returns the given events for any window
pub fn setup_mock_client(events: Vec<RawEvent>) -> MockCalendarClient {
    let mut mock_client = MockCalendarClient::new();

    mock_client.expect_list_events().returning(move |_, _| {
        Ok(EventList {
            events: events.clone(),
            next_page_token: None,
        })
    });

    mock_client
}

// Mock client whose provider call always fails
pub fn setup_failing_client(status: u16) -> MockCalendarClient {
    let mut mock_client = MockCalendarClient::new();

    mock_client.expect_list_events().returning(move |_, _| {
        Err(CalendarError::Api {
            status,
            message: "Rate Limit Exceeded".to_string(),
        })
    });

    mock_client
}
