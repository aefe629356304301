use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::tour::{self, TourStatus};
use crate::entities::user;
use crate::error::{AppError, AppResult};
use crate::extractors::AdminClaims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TourResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub max_capacity: i32,
    pub current_bookings: i32,
    pub price_per_person: Option<f64>,
    pub status: TourStatus,
    pub notes: String,
    pub available_spots: i32,
    pub is_full: bool,
    pub duration_days: i64,
    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub updated_at: sea_orm::prelude::DateTimeWithTimeZone,
}

fn tour_response(t: tour::Model, created_by_name: String) -> TourResponse {
    TourResponse {
        available_spots: t.available_spots(),
        is_full: t.is_full(),
        duration_days: t.duration_days(),
        id: t.id,
        title: t.title,
        description: t.description,
        destination: t.destination,
        start_date: t.start_date,
        end_date: t.end_date,
        start_time: t.start_time,
        max_capacity: t.max_capacity,
        current_bookings: t.current_bookings,
        price_per_person: t.price_per_person,
        status: t.status,
        notes: t.notes,
        created_by: t.created_by,
        created_by_name,
        created_at: t.created_at,
        updated_at: t.updated_at,
    }
}

fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::BadRequest(
            "End date cannot be before start date".to_string(),
        ));
    }
    Ok(())
}

async fn creator_name(state: &AppState, user_id: Uuid) -> AppResult<String> {
    let name = user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .map(|u| u.full_name())
        .unwrap_or_default();
    Ok(name)
}

/// List all tours in schedule order (public)
pub async fn list_tours(State(state): State<AppState>) -> AppResult<Json<Vec<TourResponse>>> {
    let tours = tour::Entity::find()
        .order_by_asc(tour::Column::StartDate)
        .order_by_asc(tour::Column::StartTime)
        .all(&state.db)
        .await?;

    let users = user::Entity::find().all(&state.db).await?;

    let responses = tours
        .into_iter()
        .map(|t| {
            let name = users
                .iter()
                .find(|u| u.id == t.created_by)
                .map(|u| u.full_name())
                .unwrap_or_default();
            tour_response(t, name)
        })
        .collect();

    Ok(Json(responses))
}

/// Upcoming scheduled tours for the public site
pub async fn upcoming_tours(State(state): State<AppState>) -> AppResult<Json<Vec<TourResponse>>> {
    let today = Utc::now().date_naive();

    let tours = tour::Entity::find()
        .filter(tour::Column::StartDate.gte(today))
        .filter(tour::Column::Status.eq(TourStatus::Scheduled))
        .order_by_asc(tour::Column::StartDate)
        .all(&state.db)
        .await?;

    let users = user::Entity::find().all(&state.db).await?;

    let responses = tours
        .into_iter()
        .map(|t| {
            let name = users
                .iter()
                .find(|u| u.id == t.created_by)
                .map(|u| u.full_name())
                .unwrap_or_default();
            tour_response(t, name)
        })
        .collect();

    Ok(Json(responses))
}

/// Get a single tour (admin)
pub async fn get_tour(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TourResponse>> {
    let tour = tour::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;

    let name = creator_name(&state, tour.created_by).await?;
    Ok(Json(tour_response(tour, name)))
}

#[derive(Debug, Deserialize)]
pub struct CreateTourRequest {
    pub title: String,
    pub description: Option<String>,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    #[serde(default = "default_capacity")]
    pub max_capacity: i32,
    pub price_per_person: Option<f64>,
    pub notes: Option<String>,
}

fn default_capacity() -> i32 {
    8
}

/// Schedule a new tour (admin)
pub async fn create_tour(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    Json(payload): Json<CreateTourRequest>,
) -> AppResult<(StatusCode, Json<TourResponse>)> {
    let title = payload.title.trim().to_string();
    let destination = payload.destination.trim().to_string();

    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if destination.is_empty() {
        return Err(AppError::BadRequest("Destination is required".to_string()));
    }
    validate_date_range(payload.start_date, payload.end_date)?;
    if payload.max_capacity < 1 {
        return Err(AppError::BadRequest(
            "Capacity must be at least 1".to_string(),
        ));
    }

    let new_tour = tour::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(payload.description.unwrap_or_default()),
        destination: Set(destination),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        start_time: Set(payload.start_time),
        max_capacity: Set(payload.max_capacity),
        current_bookings: Set(0),
        price_per_person: Set(payload.price_per_person),
        status: Set(TourStatus::Scheduled),
        notes: Set(payload.notes.unwrap_or_default()),
        created_by: Set(claims.sub),
        ..Default::default()
    };

    let created = new_tour.insert(&state.db).await?;
    let name = creator_name(&state, created.created_by).await?;

    Ok((StatusCode::CREATED, Json(tour_response(created, name))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTourRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub max_capacity: Option<i32>,
    pub price_per_person: Option<f64>,
    pub status: Option<TourStatus>,
    pub notes: Option<String>,
}

/// Update a tour (admin)
pub async fn update_tour(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTourRequest>,
) -> AppResult<Json<TourResponse>> {
    let current = tour::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;

    let start = payload.start_date.unwrap_or(current.start_date);
    let end = payload.end_date.unwrap_or(current.end_date);
    validate_date_range(start, end)?;

    if let Some(capacity) = payload.max_capacity {
        if capacity < current.current_bookings {
            return Err(AppError::BadRequest(
                "Current bookings cannot exceed maximum capacity".to_string(),
            ));
        }
    }

    let mut active: tour::ActiveModel = current.into();

    if let Some(title) = payload.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()));
        }
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(destination) = payload.destination {
        let destination = destination.trim().to_string();
        if destination.is_empty() {
            return Err(AppError::BadRequest(
                "Destination cannot be empty".to_string(),
            ));
        }
        active.destination = Set(destination);
    }
    if payload.start_date.is_some() {
        active.start_date = Set(start);
    }
    if payload.end_date.is_some() {
        active.end_date = Set(end);
    }
    if let Some(time) = payload.start_time {
        active.start_time = Set(Some(time));
    }
    if let Some(capacity) = payload.max_capacity {
        active.max_capacity = Set(capacity);
    }
    if let Some(price) = payload.price_per_person {
        active.price_per_person = Set(Some(price));
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(notes);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.db).await?;
    let name = creator_name(&state, updated.created_by).await?;

    Ok(Json(tour_response(updated, name)))
}

/// Delete a tour (admin)
pub async fn delete_tour(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = tour::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Tour not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Tour deleted" })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCapacityRequest {
    pub current_bookings: Option<i32>,
}

/// Update a tour's booked headcount (admin)
pub async fn update_tour_capacity(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCapacityRequest>,
) -> AppResult<Json<TourResponse>> {
    let tour = tour::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tour not found".to_string()))?;

    let current_bookings = payload.current_bookings.ok_or_else(|| {
        AppError::BadRequest("current_bookings field is required".to_string())
    })?;

    if current_bookings < 0 {
        return Err(AppError::BadRequest(
            "Current bookings cannot be negative".to_string(),
        ));
    }
    if current_bookings > tour.max_capacity {
        return Err(AppError::BadRequest(
            "Current bookings cannot exceed maximum capacity".to_string(),
        ));
    }

    let mut active: tour::ActiveModel = tour.into();
    active.current_bookings = Set(current_bookings);
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.db).await?;
    let name = creator_name(&state, updated.created_by).await?;

    Ok(Json(tour_response(updated, name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_before_start_rejected() {
        let start = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 9, 8).unwrap();
        assert!(validate_date_range(start, end).is_err());
    }

    #[test]
    fn test_single_day_tour_allowed() {
        let day = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        assert!(validate_date_range(day, day).is_ok());
    }
}
