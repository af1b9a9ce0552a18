use std::collections::HashMap;

use chrono::{DateTime, Datelike};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tracing::warn;

use crate::models::dashboard::UnmatchedService;
use crate::models::event::RawEvent;
use crate::models::tariff::TariffEntry;
use crate::services::parser::AppointmentParser;

/// Estimated revenue for the month containing `now`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevenueEstimate {
    pub total: Decimal,
    /// Events priced from the tariff list.
    pub matched: usize,
    pub unmatched: Vec<UnmatchedService>,
}

/// Sum tariff prices of this month's appointments.
///
/// Services are looked up by exact tariff name. A service with no tariff is
/// skipped and reported in `unmatched`; it never aborts the sum.
pub fn estimate_monthly_revenue(
    events: &[RawEvent],
    now: DateTime<Tz>,
    tariffs: &HashMap<String, TariffEntry>,
    parser: &AppointmentParser,
) -> RevenueEstimate {
    let tz = now.timezone();
    let mut estimate = RevenueEstimate::default();

    for event in events {
        let Some(start) = event.start else {
            continue;
        };
        let local = start.with_timezone(&tz);
        if local.year() != now.year() || local.month() != now.month() {
            continue;
        }

        let service = parser.service_type(event.title());
        match tariffs.get(&service) {
            Some(tariff) => {
                estimate.total += tariff.prix;
                estimate.matched += 1;
            }
            None => {
                warn!("No tariff for service '{}' (event {}: '{}')", service, event.id, event.title());
                estimate.unmatched.push(UnmatchedService {
                    service,
                    title: event.title().to_string(),
                });
            }
        }
    }

    estimate
}
