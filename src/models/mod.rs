use crate::entities::images;
use crate::utils::tags::split_tags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Identity attached to a request by the session middleware.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    #[serde(skip)]
    pub session_id: String,
}

/// Issued by a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: CurrentUser,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 3))]
    pub username: String,
    #[validate(length(min = 6))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct ImageRecord {
    pub id: i32,
    pub filename: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub uploaded_by: i32,
    pub created_at: DateTime<Utc>,
}

impl From<images::Model> for ImageRecord {
    fn from(model: images::Model) -> Self {
        Self {
            id: model.id,
            tags: split_tags(&model.tags),
            filename: model.filename,
            title: model.title,
            description: model.description,
            uploaded_by: model.uploaded_by,
            created_at: model.created_at,
        }
    }
}

/// File part of an upload form.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Fields collected from the upload form, before validation.
#[derive(Debug, Default)]
pub struct ImageUpload {
    pub file: Option<UploadedFile>,
    pub title: String,
    pub description: Option<String>,
    pub tags: String,
}

/// OpenAPI description of the `POST /upload` multipart form.
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
    title: String,
    description: Option<String>,
    /// Comma-separated tag list
    tags: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateImageRequest {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    /// Comma-separated tag list
    pub tags: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct ImageQuery {
    /// Case-insensitive substring matched against title or description
    pub search: Option<String>,
    /// Substring matched against the stored tag string
    pub tag: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub id: i32,
}
