use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{location, location_image};
use crate::error::{AppError, AppResult};
use crate::extractors::AdminClaims;
use crate::services::storage::{
    is_supported_image, MediaStore, MAX_IMAGES_PER_LOCATION, MAX_IMAGE_BYTES,
};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LocationImageResponse {
    pub id: Uuid,
    pub image_url: String,
    pub caption: String,
    pub order: i32,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub images: Vec<LocationImageResponse>,
    pub primary_image_url: Option<String>,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub updated_at: sea_orm::prelude::DateTimeWithTimeZone,
}

fn location_response(
    media: &MediaStore,
    loc: location::Model,
    images: Vec<location_image::Model>,
) -> LocationResponse {
    let images: Vec<LocationImageResponse> = images
        .into_iter()
        .map(|img| LocationImageResponse {
            id: img.id,
            image_url: media.public_url(&img.file_path),
            caption: img.caption,
            order: img.sort_order,
        })
        .collect();

    let primary_image_url = images.first().map(|img| img.image_url.clone());

    LocationResponse {
        id: loc.id,
        title: loc.title,
        description: loc.description,
        images,
        primary_image_url,
        created_at: loc.created_at,
        updated_at: loc.updated_at,
    }
}

/// One image file pulled out of the multipart form, paired with its caption.
#[derive(Debug)]
pub struct UploadedImage {
    pub content_type: String,
    pub caption: String,
    pub bytes: Vec<u8>,
}

/// Apply the gallery upload rules: at most 5 images per location, and each
/// file over the 5 MiB cap is dropped individually while the rest of the
/// batch still goes through.
fn validate_image_batch(images: Vec<UploadedImage>) -> Result<Vec<UploadedImage>, String> {
    if images.is_empty() {
        return Err("At least one image is required".to_string());
    }
    if images.len() > MAX_IMAGES_PER_LOCATION {
        return Err(format!(
            "Maximum {} images allowed per location",
            MAX_IMAGES_PER_LOCATION
        ));
    }

    for img in &images {
        if !is_supported_image(&img.content_type) {
            return Err(format!("Unsupported image type: {}", img.content_type));
        }
    }

    let (accepted, rejected): (Vec<_>, Vec<_>) = images
        .into_iter()
        .partition(|img| img.bytes.len() <= MAX_IMAGE_BYTES);

    if !rejected.is_empty() {
        tracing::warn!(count = rejected.len(), "Skipped images over the size limit");
    }
    if accepted.is_empty() {
        return Err("All images exceed the 5MB size limit".to_string());
    }

    Ok(accepted)
}

/// List all gallery locations, newest first (public)
pub async fn list_locations(State(state): State<AppState>) -> AppResult<Json<Vec<LocationResponse>>> {
    let locations = location::Entity::find()
        .order_by_desc(location::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let all_images = location_image::Entity::find()
        .order_by_asc(location_image::Column::SortOrder)
        .all(&state.db)
        .await?;

    let responses = locations
        .into_iter()
        .map(|loc| {
            let images: Vec<_> = all_images
                .iter()
                .filter(|img| img.location_id == loc.id)
                .cloned()
                .collect();
            location_response(&state.media, loc, images)
        })
        .collect();

    Ok(Json(responses))
}

/// Create a gallery location from a multipart form: title, description,
/// 1-5 images with optional captions (admin)
pub async fn create_location(
    State(state): State<AppState>,
    AdminClaims(claims): AdminClaims,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<LocationResponse>)> {
    let mut title = String::new();
    let mut description: Option<String> = None;
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut captions: Vec<String> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart request: {}", e)))?
    {
        match field.name() {
            Some("title") => {
                title = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid title field: {}", e)))?;
            }
            Some("description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid description field: {}", e)))?;
                if !text.is_empty() {
                    description = Some(text);
                }
            }
            Some("captions") => {
                captions.push(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid caption field: {}", e)))?,
                );
            }
            Some("images") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid image upload: {}", e)))?;
                files.push((content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    if !captions.is_empty() && captions.len() != files.len() {
        return Err(AppError::BadRequest(
            "Number of captions must match number of images".to_string(),
        ));
    }

    let images: Vec<UploadedImage> = files
        .into_iter()
        .enumerate()
        .map(|(i, (content_type, bytes))| UploadedImage {
            content_type,
            caption: captions.get(i).cloned().unwrap_or_default(),
            bytes,
        })
        .collect();

    let accepted = validate_image_batch(images).map_err(AppError::BadRequest)?;

    // Files first, rows second: if the transaction fails the written files
    // are removed, so a failed upload leaves nothing under the media root.
    let mut file_paths: Vec<String> = Vec::with_capacity(accepted.len());
    for img in &accepted {
        match state
            .media
            .save_location_image(&img.content_type, &img.bytes)
            .await
        {
            Ok(rel) => file_paths.push(rel),
            Err(e) => {
                state.media.remove_all(&file_paths).await;
                return Err(e);
            }
        }
    }

    let persisted = async {
        let txn = state.db.begin().await?;

        let new_location = location::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            description: Set(description),
            user_id: Set(claims.sub),
            ..Default::default()
        };
        let created = new_location.insert(&txn).await?;

        let mut stored: Vec<location_image::Model> = Vec::with_capacity(accepted.len());
        for (i, (img, file_path)) in accepted.iter().zip(&file_paths).enumerate() {
            let row = location_image::ActiveModel {
                id: Set(Uuid::new_v4()),
                location_id: Set(created.id),
                file_path: Set(file_path.clone()),
                caption: Set(img.caption.clone()),
                sort_order: Set(i as i32),
                ..Default::default()
            };
            stored.push(row.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok::<_, AppError>((created, stored))
    }
    .await;

    match persisted {
        Ok((created, stored)) => Ok((
            StatusCode::CREATED,
            Json(location_response(&state.media, created, stored)),
        )),
        Err(e) => {
            state.media.remove_all(&file_paths).await;
            Err(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLocationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Update a location's title and description; images are immutable after
/// creation (admin)
pub async fn update_location(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> AppResult<Json<LocationResponse>> {
    let current = location::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;

    let mut active: location::ActiveModel = current.into();

    if let Some(title) = payload.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()));
        }
        active.title = Set(title);
    }
    if let Some(description) = payload.description {
        active.description = Set(if description.is_empty() {
            None
        } else {
            Some(description)
        });
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.db).await?;

    let images = location_image::Entity::find()
        .filter(location_image::Column::LocationId.eq(updated.id))
        .order_by_asc(location_image::Column::SortOrder)
        .all(&state.db)
        .await?;

    Ok(Json(location_response(&state.media, updated, images)))
}

/// Delete a location and its stored images (admin)
pub async fn delete_location(
    State(state): State<AppState>,
    AdminClaims(_claims): AdminClaims,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let existing = location::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;

    let images = location_image::Entity::find()
        .filter(location_image::Column::LocationId.eq(existing.id))
        .all(&state.db)
        .await?;

    // Image rows cascade with the location; files are removed best-effort.
    location::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;

    for img in images {
        state.media.remove(&img.file_path).await;
    }

    Ok(Json(serde_json::json!({ "message": "Location deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(size: usize) -> UploadedImage {
        UploadedImage {
            content_type: "image/jpeg".to_string(),
            caption: String::new(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(validate_image_batch(vec![]).is_err());
    }

    #[test]
    fn test_more_than_five_images_rejected() {
        let batch: Vec<_> = (0..6).map(|_| image(100)).collect();
        let err = validate_image_batch(batch).unwrap_err();
        assert!(err.contains("Maximum 5 images"));
    }

    #[test]
    fn test_oversized_image_dropped_but_valid_ones_kept() {
        let batch = vec![image(100), image(MAX_IMAGE_BYTES + 1), image(200)];
        let accepted = validate_image_batch(batch).unwrap();
        assert_eq!(accepted.len(), 2);
    }

    #[test]
    fn test_batch_of_only_oversized_images_rejected() {
        let batch = vec![image(MAX_IMAGE_BYTES + 1)];
        let err = validate_image_batch(batch).unwrap_err();
        assert!(err.contains("size limit"));
    }

    #[test]
    fn test_non_image_content_rejected() {
        let mut bad = image(100);
        bad.content_type = "application/pdf".to_string();
        assert!(validate_image_batch(vec![bad]).is_err());
    }

    #[test]
    fn test_exactly_five_images_accepted() {
        let batch: Vec<_> = (0..5).map(|_| image(100)).collect();
        assert_eq!(validate_image_batch(batch).unwrap().len(), 5);
    }
}
