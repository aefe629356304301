use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveEnum, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingStatus};
use crate::error::{AppError, AppResult};
use crate::extractors::AdminClaims;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub destination: String,
    #[serde(default = "default_group_size")]
    pub group_size: i32,
    pub preferred_date: Option<NaiveDate>,
    pub special_requests: Option<String>,
}

fn default_group_size() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingRequest {
    pub status: Option<BookingStatus>,
    pub confirmed_date: Option<NaiveDate>,
    pub confirmed_time: Option<NaiveTime>,
    pub duration_days: Option<i32>,
    pub amount: Option<f64>,
    pub notes: Option<String>,
    pub admin_message: Option<String>,
    pub send_notification: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SendNotificationRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// The body is optional; a bare POST means a status update.
fn notification_kind(payload: Option<SendNotificationRequest>) -> String {
    payload
        .and_then(|p| p.kind)
        .unwrap_or_else(|| "status".to_string())
}

#[derive(Debug, Serialize)]
pub struct BookingStatistics {
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub confirmed_bookings: u64,
    pub completed_bookings: u64,
    pub cancelled_bookings: u64,
    pub recent_bookings: u64,
}

/// Reject an illegal lifecycle move before anything is written. Confirming
/// requires a confirmed date, either in this update or already on the record.
fn validate_status_change(
    current: BookingStatus,
    requested: BookingStatus,
    effective_confirmed_date: Option<NaiveDate>,
) -> Result<(), AppError> {
    if !current.can_transition_to(requested) {
        return Err(AppError::BadRequest(format!(
            "Cannot change booking status from {} to {}",
            current.to_value(),
            requested.to_value()
        )));
    }

    if requested == BookingStatus::Confirmed && effective_confirmed_date.is_none() {
        return Err(AppError::BadRequest(
            "Confirmed date is required when confirming a booking".to_string(),
        ));
    }

    Ok(())
}

/// Create a booking from the public booking form
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<booking::Model>)> {
    let customer_name = payload.customer_name.trim().to_string();
    let customer_email = payload.customer_email.trim().to_string();
    let destination = payload.destination.trim().to_string();

    if customer_name.is_empty() {
        return Err(AppError::BadRequest("Customer name is required".to_string()));
    }
    if customer_email.is_empty() || !customer_email.contains('@') {
        return Err(AppError::BadRequest(
            "A valid customer email is required".to_string(),
        ));
    }
    if destination.is_empty() {
        return Err(AppError::BadRequest("Destination is required".to_string()));
    }
    if payload.group_size < 1 {
        return Err(AppError::BadRequest(
            "Group size must be at least 1".to_string(),
        ));
    }

    let new_booking = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_name: Set(customer_name),
        customer_email: Set(customer_email),
        customer_phone: Set(payload.customer_phone),
        destination: Set(destination),
        group_size: Set(payload.group_size),
        preferred_date: Set(payload.preferred_date),
        duration_days: Set(1),
        special_requests: Set(payload.special_requests.unwrap_or_default()),
        notes: Set(String::new()),
        admin_message: Set(String::new()),
        status: Set(BookingStatus::Pending),
        customer_notified: Set(false),
        ..Default::default()
    };

    let created = new_booking.insert(&state.db).await?;

    // Acknowledgement emails are side effects; a delivery problem must not
    // lose the booking.
    if let Some(mailer) = &state.mailer {
        if let Err(e) = mailer.send_booking_received(&created).await {
            tracing::warn!(booking_id = %created.id, error = %e, "Failed to send booking acknowledgement");
        }
        if let Err(e) = mailer.send_admin_alert(&created).await {
            tracing::warn!(booking_id = %created.id, error = %e, "Failed to send admin alert");
        }
    }

    Ok((StatusCode::CREATED, Json(created)))
}

/// List all bookings, newest first (admin)
pub async fn list_bookings(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
) -> AppResult<Json<Vec<booking::Model>>> {
    let bookings = booking::Entity::find()
        .order_by_desc(booking::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(bookings))
}

/// Get a single booking (admin)
pub async fn get_booking(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Json<booking::Model>> {
    let booking = booking::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    Ok(Json(booking))
}

/// Update a booking: schedule fields and guarded status transitions (admin)
pub async fn update_booking(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingRequest>,
) -> AppResult<Json<booking::Model>> {
    let current = booking::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let status_change = payload
        .status
        .filter(|requested| *requested != current.status);

    if let Some(requested) = status_change {
        validate_status_change(
            current.status,
            requested,
            payload.confirmed_date.or(current.confirmed_date),
        )?;
    }

    let date_changed =
        matches!(payload.confirmed_date, Some(d) if current.confirmed_date != Some(d));
    let time_changed =
        matches!(payload.confirmed_time, Some(t) if current.confirmed_time != Some(t));

    let mut active: booking::ActiveModel = current.clone().into();

    if date_changed || time_changed {
        active.previous_confirmed_date = Set(current.confirmed_date);
        active.previous_confirmed_time = Set(current.confirmed_time);
    }
    if let Some(date) = payload.confirmed_date {
        active.confirmed_date = Set(Some(date));
    }
    if let Some(time) = payload.confirmed_time {
        active.confirmed_time = Set(Some(time));
    }
    if let Some(days) = payload.duration_days {
        if days < 1 {
            return Err(AppError::BadRequest(
                "Duration must be at least 1 day".to_string(),
            ));
        }
        active.duration_days = Set(days);
    }
    if let Some(amount) = payload.amount {
        active.amount = Set(Some(amount));
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(notes);
    }
    if let Some(message) = payload.admin_message {
        active.admin_message = Set(message);
    }
    if let Some(requested) = status_change {
        active.status = Set(requested);
    }
    active.updated_at = Set(Utc::now().into());

    let mut updated = active.update(&state.db).await?;

    let send_notification = payload.send_notification.unwrap_or(true);
    if send_notification {
        if let Some(mailer) = &state.mailer {
            let result = if date_changed || time_changed {
                mailer.send_date_time_update(&updated).await
            } else if status_change.is_some() {
                mailer.send_status_update(&updated).await
            } else {
                Ok(())
            };

            match result {
                Ok(()) if date_changed || time_changed || status_change.is_some() => {
                    updated = mark_notified(&state, updated).await?;
                }
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!(booking_id = %updated.id, error = %e, "Failed to send booking notification");
                }
            }
        }
    }

    Ok(Json(updated))
}

/// Delete a booking (admin)
pub async fn delete_booking(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = booking::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Booking deleted" })))
}

/// Manually send a customer notification for a booking (admin)
pub async fn send_booking_notification(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
    payload: Option<Json<SendNotificationRequest>>,
) -> AppResult<Response> {
    let booking = booking::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let Some(mailer) = &state.mailer else {
        let body = serde_json::json!({
            "success": false,
            "message": "Email delivery is not configured",
        });
        return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response());
    };

    let kind = notification_kind(payload.map(|Json(p)| p));
    let (result, sent_message, failed_message) = if kind == "date_time" {
        (
            mailer.send_date_time_update(&booking).await,
            "Date/time update notification sent",
            "Failed to send notification",
        )
    } else {
        (
            mailer.send_status_update(&booking).await,
            "Status update notification sent",
            "Failed to send notification",
        )
    };

    match result {
        Ok(()) => {
            mark_notified(&state, booking).await?;
            let body = serde_json::json!({ "success": true, "message": sent_message });
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        Err(e) => {
            tracing::warn!(booking_id = %id, error = %e, "Failed to send booking notification");
            let body = serde_json::json!({ "success": false, "message": failed_message });
            Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response())
        }
    }
}

/// Booking statistics for the admin dashboard overview (admin)
pub async fn booking_statistics(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
) -> AppResult<Json<BookingStatistics>> {
    let db = &state.db;

    let total_bookings = booking::Entity::find().count(db).await?;
    let pending_bookings = count_by_status(&state, BookingStatus::Pending).await?;
    let confirmed_bookings = count_by_status(&state, BookingStatus::Confirmed).await?;
    let completed_bookings = count_by_status(&state, BookingStatus::Completed).await?;
    let cancelled_bookings = count_by_status(&state, BookingStatus::Cancelled).await?;

    let cutoff: sea_orm::prelude::DateTimeWithTimeZone = (Utc::now() - Duration::days(30)).into();
    let recent_bookings = booking::Entity::find()
        .filter(booking::Column::CreatedAt.gte(cutoff))
        .count(db)
        .await?;

    Ok(Json(BookingStatistics {
        total_bookings,
        pending_bookings,
        confirmed_bookings,
        completed_bookings,
        cancelled_bookings,
        recent_bookings,
    }))
}

async fn count_by_status(state: &AppState, status: BookingStatus) -> AppResult<u64> {
    Ok(booking::Entity::find()
        .filter(booking::Column::Status.eq(status))
        .count(&state.db)
        .await?)
}

/// Record that the customer has been notified.
async fn mark_notified(state: &AppState, booking: booking::Model) -> AppResult<booking::Model> {
    let mut active: booking::ActiveModel = booking.into();
    active.customer_notified = Set(true);
    active.last_notification_sent = Set(Some(Utc::now().into()));
    Ok(active.update(&state.db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_confirming_requires_a_date() {
        let err = validate_status_change(BookingStatus::Pending, BookingStatus::Confirmed, None)
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_confirming_accepts_date_from_payload_or_record() {
        assert!(validate_status_change(
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            Some(a_date())
        )
        .is_ok());
    }

    #[test]
    fn test_cancelling_needs_no_date() {
        assert!(validate_status_change(BookingStatus::Pending, BookingStatus::Cancelled, None).is_ok());
        assert!(
            validate_status_change(BookingStatus::Confirmed, BookingStatus::Cancelled, None).is_ok()
        );
    }

    #[test]
    fn test_completing_only_from_confirmed() {
        assert!(
            validate_status_change(BookingStatus::Confirmed, BookingStatus::Completed, None).is_ok()
        );
        assert!(
            validate_status_change(BookingStatus::Pending, BookingStatus::Completed, None).is_err()
        );
    }

    #[test]
    fn test_notification_kind_defaults_to_status() {
        assert_eq!(notification_kind(None), "status");
        assert_eq!(
            notification_kind(Some(SendNotificationRequest { kind: None })),
            "status"
        );
        assert_eq!(
            notification_kind(Some(SendNotificationRequest {
                kind: Some("date_time".to_string())
            })),
            "date_time"
        );
    }

    #[test]
    fn test_terminal_states_reject_all_changes() {
        for terminal in [BookingStatus::Cancelled, BookingStatus::Completed] {
            for next in [
                BookingStatus::Pending,
                BookingStatus::Confirmed,
                BookingStatus::Cancelled,
                BookingStatus::Completed,
            ] {
                if next != terminal {
                    assert!(validate_status_change(terminal, next, Some(a_date())).is_err());
                }
            }
        }
    }
}
