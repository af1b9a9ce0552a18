use axum::{routing::get, Router};
use std::sync::Arc;

use crate::handlers::api::{
    create_tariff, delete_tariff, get_dashboard, list_tariffs, recent_appointments, show_tariff,
    update_tariff, AppState,
};
use crate::handlers::health::health_check;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Dashboard is served under both the API prefix and the page path
    let dashboard_routes = Router::new()
        .route("/api/dashboard", get(get_dashboard))
        .route("/dashboard", get(get_dashboard))
        .route("/api/rendez-vous/recents", get(recent_appointments));

    let tariff_routes = Router::new()
        .route("/api/tarifs", get(list_tariffs).post(create_tariff))
        .route(
            "/api/tarifs/:id",
            get(show_tariff).put(update_tariff).delete(delete_tariff),
        );

    Router::new()
        .route("/health", get(health_check))
        .merge(dashboard_routes)
        .merge(tariff_routes)
        .with_state(app_state)
}
