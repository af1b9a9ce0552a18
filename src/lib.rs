//! Effynails Dashboard Service
//!
//! This library backs the salon's admin dashboard. It reads appointments
//! from a Google Calendar shared with other activities, keeps the salon's
//! bookings, extracts client details from their titles and descriptions
//! and aggregates them with the tariff list into a dashboard snapshot.
//!
//! # Modules
//!
//! - `client`: `CalendarProvider` trait and the Google Calendar client
//! - `auth`: Bearer tokens, static or from a service-account key
//! - `services`: Fetching, filtering, parsing, aggregation, revenue, tariffs
//! - `handlers` / `routes`: The axum HTTP surface
//!
//! # Degraded operation
//!
//! Calendar failures never fail a dashboard request. The snapshot is built
//! from an empty event list and the `x-dashboard-status` response header
//! reports `degraded`.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod client_mock;

// Re-export the main types for ease of use
pub use auth::GoogleAuth;
pub use client::{CalendarProvider, EventList, GoogleCalendarClient};
pub use config::Config;
pub use handlers::api::AppState;
pub use routes::create_router;
pub use services::dashboard::DashboardService;
