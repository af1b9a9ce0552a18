use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::client::CalendarProvider;
use crate::config::{Config, MAX_HORIZON_DAYS};
use crate::models::appointment::ParsedAppointment;
use crate::models::dashboard::{DashboardSnapshot, DashboardStats, Diagnostics, FetchStatus};
use crate::services::aggregator::{aggregate, recent, week_bounds, RECENT_LIMIT};
use crate::services::fetcher::EventFetcher;
use crate::services::filter::EventFilter;
use crate::services::parser::AppointmentParser;
use crate::services::revenue::estimate_monthly_revenue;
use crate::services::tariffs::TariffStore;

fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::default());
    // Midnight skipped by a DST change: the day starts at the end of the gap
    let local = tz
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest());

    match local {
        Some(local) => local.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}

/// Builds dashboard snapshots from one calendar fetch per request.
pub struct DashboardService {
    fetcher: EventFetcher,
    filter: EventFilter,
    parser: AppointmentParser,
    tariffs: Arc<TariffStore>,
    horizon: Duration,
}

impl DashboardService {
    pub fn new(
        fetcher: EventFetcher,
        filter: EventFilter,
        parser: AppointmentParser,
        tariffs: Arc<TariffStore>,
        horizon_days: i64,
    ) -> Self {
        Self {
            fetcher,
            filter,
            parser,
            tariffs,
            horizon: Duration::try_days(horizon_days.clamp(0, MAX_HORIZON_DAYS)).unwrap_or_default(),
        }
    }

    pub fn from_config(
        config: &Config,
        provider: Arc<dyn CalendarProvider>,
        tariffs: Arc<TariffStore>,
    ) -> Result<Self, regex::Error> {
        let parser = AppointmentParser::new(&config.business_name, &config.email_label, config.timezone)?;

        Ok(Self::new(
            EventFetcher::new(provider, config.fetch_timeout),
            EventFilter::new(&config.business_marker),
            parser,
            tariffs,
            config.upcoming_horizon_days,
        ))
    }

    /// Window covering this month, this week and the upcoming horizon.
    pub fn fetch_window(&self, now: DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
        let tz = now.timezone();
        let today = now.date_naive();

        let month_start = today.with_day(1).unwrap_or(today);
        let next_month_start = month_start
            .checked_add_months(Months::new(1))
            .unwrap_or(month_start + Duration::days(31));
        let (week_start, week_end) = week_bounds(today);

        let start = local_midnight(month_start.min(week_start), tz);
        let end = local_midnight(next_month_start.max(week_end + Duration::days(1)), tz)
            .max(
                now.with_timezone(&Utc)
                    .checked_add_signed(self.horizon)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            );

        (start, end)
    }

    pub async fn build(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let local_now = now.with_timezone(&self.parser.timezone());
        let (start, end) = self.fetch_window(local_now);

        let outcome = self.fetcher.fetch(start, end).await;
        let events = self.filter.apply(outcome.events);

        let summary = aggregate(&events, local_now, &self.parser);

        let tariffs = match self.tariffs.by_name() {
            Ok(tariffs) => tariffs,
            Err(e) => {
                warn!("Failed to load tariffs, revenue will be zero: {}", e);
                HashMap::new()
            }
        };
        let revenue = estimate_monthly_revenue(&events, local_now, &tariffs, &self.parser);

        info!(
            "Dashboard built: {} relevant events, {} today, {} this week, revenue {} ({} unmatched), fetch {}",
            events.len(),
            summary.count_today,
            summary.count_this_week,
            revenue.total,
            revenue.unmatched.len(),
            outcome.status.label()
        );

        DashboardSnapshot {
            stats: DashboardStats {
                rendez_vous_aujourdhui: summary.count_today,
                rendez_vous_semaine: summary.count_this_week,
                revenus_mois: revenue.total,
            },
            prochain_rendez_vous: summary.next,
            prochains_rendez_vous: summary.upcoming,
            services_populaires: Vec::new(),
            diagnostics: Diagnostics {
                fetch: outcome.status,
                unmatched_services: revenue.unmatched,
            },
        }
    }

    /// Latest appointments over the horizon before `now`.
    pub async fn recent(&self, now: DateTime<Utc>) -> (Vec<ParsedAppointment>, FetchStatus) {
        let since = now
            .checked_sub_signed(self.horizon)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let outcome = self.fetcher.fetch(since, now).await;
        let events = self.filter.apply(outcome.events);

        (recent(&events, RECENT_LIMIT, &self.parser), outcome.status)
    }
}
