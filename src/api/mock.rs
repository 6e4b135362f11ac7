//! Mock store endpoints: hosted listings, users, bookings, notifications

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{count_param, AppState};
use crate::error::ApiError;
use crate::storage::{
    Booking, BookingPatch, HostedProperty, NewBooking, NewPayment, NewProperty, Notification,
    Payment, PaymentPatch, PropertyPatch, User, UserPatch,
};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// GET /api/listings
pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Json<Vec<HostedProperty>> {
    let limit = count_param(params.limit.as_deref(), 20);
    let offset = count_param(params.offset.as_deref(), 0);

    Json(state.storage.list_properties(limit, offset).await)
}

/// GET /api/listings/:id
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HostedProperty>, ApiError> {
    state
        .storage
        .get_property(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("listing {}", id)))
}

/// GET /api/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    state
        .storage
        .get_user(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))
}

/// PATCH /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<User>, ApiError> {
    state
        .storage
        .update_user(&id, patch)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))
}

/// GET /api/users/:id/listings
pub async fn host_listings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<HostedProperty>> {
    Json(state.storage.properties_by_host(&id).await)
}

/// POST /api/listings
pub async fn create_listing(
    State(state): State<AppState>,
    Json(new): Json<NewProperty>,
) -> (StatusCode, Json<HostedProperty>) {
    let property = state.storage.create_property(new).await;
    (StatusCode::CREATED, Json(property))
}

/// PATCH /api/listings/:id
pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<PropertyPatch>,
) -> Result<Json<HostedProperty>, ApiError> {
    state
        .storage
        .update_property(&id, patch)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("listing {}", id)))
}

/// GET /api/listings/:id/bookings
pub async fn listing_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Booking>> {
    Json(state.storage.bookings_by_property(&id).await)
}

/// GET /api/users/:id/bookings
pub async fn user_bookings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Booking>> {
    Json(state.storage.bookings_by_user(&id).await)
}

/// GET /api/users/:id/notifications
pub async fn user_notifications(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Notification>> {
    Json(state.storage.notifications_by_user(&id).await)
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Json(new): Json<NewBooking>,
) -> (StatusCode, Json<Booking>) {
    let booking = state.storage.create_booking(new).await;
    (StatusCode::CREATED, Json(booking))
}

/// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, ApiError> {
    state
        .storage
        .get_booking(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("booking {}", id)))
}

/// PATCH /api/bookings/:id
pub async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<BookingPatch>,
) -> Result<Json<Booking>, ApiError> {
    state
        .storage
        .update_booking(&id, patch)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("booking {}", id)))
}

/// GET /api/bookings/:id/payments
pub async fn booking_payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Payment>> {
    Json(state.storage.payments_by_booking(&id).await)
}

/// POST /api/payments
pub async fn create_payment(
    State(state): State<AppState>,
    Json(new): Json<NewPayment>,
) -> (StatusCode, Json<Payment>) {
    let payment = state.storage.create_payment(new).await;
    (StatusCode::CREATED, Json(payment))
}

/// GET /api/payments/:id
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ApiError> {
    state
        .storage
        .get_payment(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("payment {}", id)))
}

/// PATCH /api/payments/:id
pub async fn update_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<PaymentPatch>,
) -> Result<Json<Payment>, ApiError> {
    state
        .storage
        .update_payment(&id, patch)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("payment {}", id)))
}

/// POST /api/notifications/:id/read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.storage.mark_notification_read(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("notification {}", id)))
    }
}
