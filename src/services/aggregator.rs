use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::models::appointment::ParsedAppointment;
use crate::models::event::RawEvent;
use crate::services::parser::AppointmentParser;

/// Maximum length of the upcoming list.
pub const UPCOMING_LIMIT: usize = 10;
/// Default length of the latest-appointments list.
pub const RECENT_LIMIT: usize = 5;

/// Counts and lists derived from the relevant events of one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentSummary {
    pub count_today: usize,
    pub count_this_week: usize,
    pub upcoming: Vec<ParsedAppointment>,
    pub next: Option<ParsedAppointment>,
}

/// Monday and Sunday of the week containing `date`.
pub fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
    (monday, monday + Duration::days(6))
}

fn local_date(start: DateTime<Utc>, tz: Tz) -> NaiveDate {
    start.with_timezone(&tz).date_naive()
}

/// Build today/week counters and the upcoming list.
///
/// `events` must already be filtered. Events without a concrete start are
/// left out of every bucket. The upcoming sort is stable so equal starts
/// keep provider order.
pub fn aggregate(events: &[RawEvent], now: DateTime<Tz>, parser: &AppointmentParser) -> AppointmentSummary {
    let tz = now.timezone();
    let today = now.date_naive();
    let (week_start, week_end) = week_bounds(today);
    let now_utc = now.with_timezone(&Utc);

    let local_dates: Vec<NaiveDate> = events
        .iter()
        .filter_map(|e| e.start)
        .map(|start| local_date(start, tz))
        .collect();

    let count_today = local_dates.iter().filter(|date| **date == today).count();
    let count_this_week = local_dates
        .iter()
        .filter(|date| **date >= week_start && **date <= week_end)
        .count();

    let mut future: Vec<&RawEvent> = events
        .iter()
        .filter(|e| e.start.map_or(false, |start| start >= now_utc))
        .collect();
    future.sort_by_key(|e| e.start.unwrap_or(DateTime::<Utc>::MAX_UTC));

    let upcoming: Vec<ParsedAppointment> = future
        .into_iter()
        .take(UPCOMING_LIMIT)
        .map(|e| parser.parse(e))
        .collect();
    let next = upcoming.first().cloned();

    AppointmentSummary {
        count_today,
        count_this_week,
        upcoming,
        next,
    }
}

/// Latest appointments first, events without a start last.
pub fn recent(events: &[RawEvent], limit: usize, parser: &AppointmentParser) -> Vec<ParsedAppointment> {
    let mut sorted: Vec<&RawEvent> = events.iter().collect();
    sorted.sort_by(|a, b| match (a.start, b.start) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    sorted
        .into_iter()
        .take(limit)
        .map(|e| parser.parse(e))
        .collect()
}
