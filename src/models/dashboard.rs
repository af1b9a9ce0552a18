use rust_decimal::Decimal;
use serde::Serialize;

use super::appointment::ParsedAppointment;

/// Headline counters shown at the top of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub rendez_vous_aujourdhui: usize,
    pub rendez_vous_semaine: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenus_mois: Decimal,
}

/// A service name seen in the calendar that has no tariff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnmatchedService {
    pub service: String,
    pub title: String,
}

/// How complete the calendar data behind a snapshot is.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchStatus {
    #[default]
    Complete,
    /// The provider had more pages that were not requested.
    Partial,
    /// The provider call failed; the snapshot was built from no events.
    Failed(String),
}

impl FetchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FetchStatus::Complete => "complete",
            FetchStatus::Partial => "partial",
            FetchStatus::Failed(_) => "degraded",
        }
    }
}

/// Observability data attached to a snapshot but not sent to the front-end.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagnostics {
    pub fetch: FetchStatus,
    pub unmatched_services: Vec<UnmatchedService>,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    pub prochain_rendez_vous: Option<ParsedAppointment>,
    pub prochains_rendez_vous: Vec<ParsedAppointment>,
    /// Reserved for a "most booked services" panel; always empty.
    pub services_populaires: Vec<serde_json::Value>,
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}
