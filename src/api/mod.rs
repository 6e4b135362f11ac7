//! HTTP surface: router, shared state and handlers

pub mod auth;
pub mod mock;
pub mod properties;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::cache::DatasetCache;
use crate::ingestion::utils::parse_int;
use crate::storage::MemStorage;

#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<DatasetCache>,
    pub storage: Arc<MemStorage>,
}

impl AppState {
    pub fn new(cache: DatasetCache, storage: MemStorage) -> Self {
        Self {
            cache: Arc::new(cache),
            storage: Arc::new(storage),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse {
    message: String,
    status: String,
}

async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Rental listings API is running!".to_string(),
        status: "ok".to_string(),
    })
}

/// Non-negative count, or the default when absent or unparseable
pub(crate) fn count_param(param: Option<&str>, default: usize) -> usize {
    param
        .and_then(parse_int)
        .map(|n| usize::try_from(n).unwrap_or(0))
        .unwrap_or(default)
}

fn property_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(properties::list_properties))
        .route("/cities", get(properties::list_cities))
        .route("/popular", get(properties::popular_properties))
        .route("/next-month", get(properties::next_month_properties))
        .route("/:id", get(properties::property_detail))
}

/// Full application router. Property routes are mounted at `/properties`
/// and again under `/api` for the browser client.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/api/health", get(health_check))
        .nest("/properties", property_routes())
        .nest("/api/properties", property_routes())
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route(
            "/api/listings",
            get(mock::list_listings).post(mock::create_listing),
        )
        .route(
            "/api/listings/:id",
            get(mock::get_listing).patch(mock::update_listing),
        )
        .route("/api/listings/:id/bookings", get(mock::listing_bookings))
        .route(
            "/api/users/:id",
            get(mock::get_user).patch(mock::update_user),
        )
        .route("/api/users/:id/listings", get(mock::host_listings))
        .route("/api/users/:id/bookings", get(mock::user_bookings))
        .route("/api/users/:id/notifications", get(mock::user_notifications))
        .route("/api/bookings", post(mock::create_booking))
        .route(
            "/api/bookings/:id",
            get(mock::get_booking).patch(mock::update_booking),
        )
        .route("/api/bookings/:id/payments", get(mock::booking_payments))
        .route("/api/payments", post(mock::create_payment))
        .route(
            "/api/payments/:id",
            get(mock::get_payment).patch(mock::update_payment),
        )
        .route(
            "/api/notifications/:id/read",
            post(mock::mark_notification_read),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
