use crate::api::error::AppError;
use crate::entities::{prelude::*, *};
use crate::models::{CurrentUser, ImageQuery, ImageRecord, ImageUpload, UpdateImageRequest};
use crate::services::storage::StorageService;
use crate::utils::tags::{normalize_tags, unique_sorted_tags};
use crate::utils::validation::{
    generate_stored_filename, normalize_description, validate_title, validate_upload_filename,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ImageService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
}

fn image_not_found() -> AppError {
    AppError::NotFound("Image not found".to_string())
}

fn ensure_owner(image: &images::Model, caller: &CurrentUser) -> Result<(), AppError> {
    if image.uploaded_by != caller.id {
        return Err(AppError::Forbidden(
            "You can only modify your own images".to_string(),
        ));
    }
    Ok(())
}


impl ImageService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>) -> Self {
        Self { db, storage }
    }

    /// Stores the file under a generated name, then records its metadata.
    pub async fn upload(
        &self,
        owner: &CurrentUser,
        upload: ImageUpload,
    ) -> Result<ImageRecord, AppError> {
        let file = upload
            .file
            .filter(|f| !f.file_name.is_empty())
            .ok_or_else(|| AppError::Validation("No file selected".to_string()))?;
        let title = validate_title(&upload.title)?;
        let extension = validate_upload_filename(Some(&file.file_name))?;

        let filename = generate_stored_filename(&extension);
        let size = file.data.len();
        self.storage.upload_file(&filename, file.data).await?;

        let image = images::ActiveModel {
            filename: Set(filename.clone()),
            title: Set(title),
            description: Set(normalize_description(upload.description.as_deref())),
            tags: Set(normalize_tags(&upload.tags)),
            uploaded_by: Set(owner.id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let image = match image.insert(&self.db).await {
            Ok(image) => image,
            Err(e) => {
                // Compensate: the row never landed, so the file must not outlive it
                if let Err(cleanup) = self.storage.delete_file(&filename).await {
                    warn!("⚠️  Failed to remove '{}' after insert error: {}", filename, cleanup);
                }
                return Err(e.into());
            }
        };

        info!(
            "📤 User {} uploaded image {} as '{}' ({} bytes)",
            owner.id, image.id, image.filename, size
        );
        Ok(image.into())
    }

    pub async fn get(&self, id: i32) -> Result<ImageRecord, AppError> {
        Images::find_by_id(id)
            .one(&self.db)
            .await?
            .map(ImageRecord::from)
            .ok_or_else(image_not_found)
    }

    /// Looks up an image the caller is allowed to modify: `NotFound` first, then `Forbidden`.
    pub async fn find_owned(&self, id: i32, caller: &CurrentUser) -> Result<images::Model, AppError> {
        let image = Images::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(image_not_found)?;
        ensure_owner(&image, caller)?;
        Ok(image)
    }

    /// Replaces title, description and tags of an image obtained from
    /// [`Self::find_owned`]. A blank title is rejected.
    pub async fn update(
        &self,
        image: images::Model,
        caller: &CurrentUser,
        req: UpdateImageRequest,
    ) -> Result<ImageRecord, AppError> {
        let id = image.id;
        let title = validate_title(&req.title)?;

        let mut active = image.into_active_model();
        active.title = Set(title);
        active.description = Set(normalize_description(req.description.as_deref()));
        active.tags = Set(normalize_tags(req.tags.as_deref().unwrap_or_default()));
        let updated = active.update(&self.db).await?;

        info!("✏️  User {} updated image {}", caller.id, id);
        Ok(updated.into())
    }

    /// Removes the row, then the file. A failed file removal is only logged;
    /// the orphan sweeper collects what is left behind.
    pub async fn delete(&self, id: i32, caller: &CurrentUser) -> Result<(), AppError> {
        let image = self.find_owned(id, caller).await?;

        Images::delete_by_id(image.id).exec(&self.db).await?;

        if let Err(e) = self.storage.delete_file(&image.filename).await {
            warn!("⚠️  Error deleting file '{}': {}", image.filename, e);
        }

        info!("🗑️  User {} deleted image {}", caller.id, id);
        Ok(())
    }

    /// All images matching the optional filters, newest first.
    ///
    /// Filters are plain `LIKE '%term%'`; SQLite folds case for ASCII letters only.
    pub async fn list(&self, query: &ImageQuery) -> Result<Vec<ImageRecord>, AppError> {
        let mut cond = Condition::all();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            cond = cond.add(
                Condition::any()
                    .add(images::Column::Title.contains(search))
                    .add(images::Column::Description.contains(search)),
            );
        }

        // Substring match on the raw tag string: "cat" also matches "category"
        if let Some(tag) = query.tag.as_deref().filter(|t| !t.is_empty()) {
            cond = cond.add(images::Column::Tags.contains(tag));
        }

        let images = Images::find()
            .filter(cond)
            .order_by_desc(images::Column::CreatedAt)
            .order_by_desc(images::Column::Id)
            .all(&self.db)
            .await?;

        Ok(images.into_iter().map(ImageRecord::from).collect())
    }

    /// Every distinct tag across all images, sorted.
    pub async fn list_all_tags(&self) -> Result<Vec<String>, AppError> {
        let tag_strings: Vec<String> = Images::find()
            .select_only()
            .column(images::Column::Tags)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(unique_sorted_tags(tag_strings))
    }
}
