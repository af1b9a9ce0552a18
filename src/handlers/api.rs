use axum::{
    extract::{Json as ExtractJson, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::error::StoreError;
use crate::models::tariff::{TariffEntry, TariffInput, ValidationErrors};
use crate::services::dashboard::DashboardService;
use crate::services::tariffs::TariffStore;

/// Response header carrying how complete the calendar data was.
pub const DASHBOARD_STATUS_HEADER: &str = "x-dashboard-status";

// AppState struct containing shared resources
pub struct AppState {
    pub dashboard: DashboardService,
    pub tariffs: Arc<TariffStore>,
}

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// Overrides the current time, mostly for previews and tests.
    ///
    /// RFC 3339. A `+` in the offset must be sent as `%2B`; a bare `+`
    /// decodes to a space and the request is rejected with 400.
    pub now: Option<DateTime<FixedOffset>>,
}

fn resolve_now(params: &DashboardParams) -> DateTime<Utc> {
    params
        .now
        .map(|now| now.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

// Dashboard endpoint, never fails because of the calendar
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let now = resolve_now(&params);
    info!("Received request for dashboard at {}", now);

    let snapshot = state.dashboard.build(now).await;
    let status = snapshot.diagnostics.fetch.label();

    if !snapshot.diagnostics.unmatched_services.is_empty() {
        warn!(
            "{} appointments this month have no tariff",
            snapshot.diagnostics.unmatched_services.len()
        );
    }

    ([(DASHBOARD_STATUS_HEADER, status)], Json(snapshot)).into_response()
}

// Latest appointments endpoint
pub async fn recent_appointments(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardParams>,
) -> Response {
    let now = resolve_now(&params);
    info!("Received request for recent appointments at {}", now);

    let (appointments, status) = state.dashboard.recent(now).await;

    ([(DASHBOARD_STATUS_HEADER, status.label())], Json(appointments)).into_response()
}

fn store_error_response(err: StoreError) -> Response {
    match err {
        StoreError::DuplicateName(nom) => {
            warn!("Rejected duplicate tariff name '{}'", nom);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrors::single("nom", "The nom has already been taken.")),
            )
                .into_response()
        }
        other => {
            error!("Tariff store error: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn validation_response(errors: ValidationErrors) -> Response {
    info!("Tariff payload rejected: {}", errors.message);
    (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
}

// List tariffs endpoint
pub async fn list_tariffs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<TariffEntry>>, Response> {
    match state.tariffs.list() {
        Ok(tariffs) => {
            info!("Returning {} tariffs", tariffs.len());
            Ok(Json(tariffs))
        }
        Err(err) => Err(store_error_response(err)),
    }
}

// Show tariff endpoint
pub async fn show_tariff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<TariffEntry>, Response> {
    match state.tariffs.get(id) {
        Ok(Some(tariff)) => Ok(Json(tariff)),
        Ok(None) => {
            warn!("Tariff {} not found", id);
            Err(StatusCode::NOT_FOUND.into_response())
        }
        Err(err) => Err(store_error_response(err)),
    }
}

// Create tariff endpoint
pub async fn create_tariff(
    State(state): State<Arc<AppState>>,
    ExtractJson(input): ExtractJson<TariffInput>,
) -> Result<(StatusCode, Json<TariffEntry>), Response> {
    let tariff = input.validate().map_err(validation_response)?;

    match state.tariffs.create(tariff) {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(err) => Err(store_error_response(err)),
    }
}

// Update tariff endpoint
pub async fn update_tariff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    ExtractJson(input): ExtractJson<TariffInput>,
) -> Result<Json<TariffEntry>, Response> {
    let tariff = input.validate().map_err(validation_response)?;

    match state.tariffs.update(id, tariff) {
        Ok(Some(updated)) => Ok(Json(updated)),
        Ok(None) => Err(StatusCode::NOT_FOUND.into_response()),
        Err(err) => Err(store_error_response(err)),
    }
}

// Delete tariff endpoint
pub async fn delete_tariff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, Response> {
    match state.tariffs.delete(id) {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(StatusCode::NOT_FOUND.into_response()),
        Err(err) => Err(store_error_response(err)),
    }
}
