use crate::AppState;
use crate::api::error::AppError;
use crate::models::{
    CurrentUser, ImageQuery, ImageRecord, ImageUpload, MessageResponse, UpdateImageRequest,
    UploadResponse, UploadedFile,
};
use axum::{
    Extension, Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::MultipartError,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::Validation(e.body_text())
    }
}

/// Ids that are not integers name no image.
fn image_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::NotFound("Image not found".to_string()))
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<ImageUpload, AppError> {
    let mut upload = ImageUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                upload.file = Some(UploadedFile {
                    file_name,
                    data: data.to_vec(),
                });
            }
            "title" => upload.title = field.text().await.map_err(multipart_error)?,
            "description" => {
                upload.description = Some(field.text().await.map_err(multipart_error)?)
            }
            "tags" => upload.tags = field.text().await.map_err(multipart_error)?,
            _ => tracing::debug!("Ignoring unexpected upload field '{}'", name),
        }
    }

    Ok(upload)
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = crate::models::UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image uploaded successfully", body = UploadResponse),
        (status = 400, description = "Missing file or title, or disallowed extension"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "Upload too large")
    ),
    security(
        ("session" = [])
    ),
    tag = "images"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = match read_upload_form(&mut multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            // Drain what is left so the client sees our response instead of a reset
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            return Err(e);
        }
    };

    let image = state.image_service.upload(&user, upload).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: "Image uploaded successfully".to_string(),
        id: image.id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/images",
    params(ImageQuery),
    responses(
        (status = 200, description = "Matching images, newest first", body = Vec<ImageRecord>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session" = [])
    ),
    tag = "images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Json<Vec<ImageRecord>>, AppError> {
    Ok(Json(state.image_service.list(&query).await?))
}

#[utoipa::path(
    get,
    path = "/api/images/{id}",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image metadata", body = ImageRecord),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Image not found")
    ),
    security(
        ("session" = [])
    ),
    tag = "images"
)]
pub async fn get_image(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<ImageRecord>, AppError> {
    Ok(Json(state.image_service.get(image_id(id)?).await?))
}

#[utoipa::path(
    put,
    path = "/api/images/{id}",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Image updated", body = MessageResponse),
        (status = 400, description = "Title is required or the body is not valid JSON"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Image not found")
    ),
    security(
        ("session" = [])
    ),
    tag = "images"
)]
pub async fn update_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdateImageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    // Existence and ownership are settled before the body is looked at
    let image = state.image_service.find_owned(image_id(id)?, &user).await?;
    let Json(req) = body.map_err(|e| AppError::Validation(e.body_text()))?;
    state.image_service.update(image, &user, req).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Image updated successfully".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/images/{id}",
    params(
        ("id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Image not found")
    ),
    security(
        ("session" = [])
    ),
    tag = "images"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    state.image_service.delete(image_id(id)?, &user).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Image deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "Sorted, distinct tags", body = Vec<String>),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session" = [])
    ),
    tag = "images"
)]
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.image_service.list_all_tags().await?))
}
