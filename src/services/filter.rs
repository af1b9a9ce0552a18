use tracing::debug;

use crate::models::event::RawEvent;

/// Keeps only the events that belong to the business on a shared calendar.
#[derive(Debug, Clone)]
pub struct EventFilter {
    marker: String,
}

impl EventFilter {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_lowercase(),
        }
    }

    /// Case-insensitive substring match of the marker against the title.
    pub fn is_relevant(&self, event: &RawEvent) -> bool {
        match event.summary.as_deref() {
            Some(title) => title.to_lowercase().contains(&self.marker),
            None => false,
        }
    }

    pub fn apply(&self, events: Vec<RawEvent>) -> Vec<RawEvent> {
        let total = events.len();
        let kept: Vec<RawEvent> = events
            .into_iter()
            .filter(|event| {
                let relevant = self.is_relevant(event);
                if !relevant {
                    debug!(
                        "Skipping event {} from {}",
                        event.id,
                        event.organizer_email.as_deref().unwrap_or("unknown organizer")
                    );
                }
                relevant
            })
            .collect();

        debug!("Kept {} of {} calendar events", kept.len(), total);
        kept
    }
}
