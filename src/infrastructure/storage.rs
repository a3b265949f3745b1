use crate::services::storage::LocalStorageService;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(upload_dir: &Path) -> anyhow::Result<Arc<LocalStorageService>> {
    info!("🗄️  Upload directory: {}", upload_dir.display());

    tokio::fs::create_dir_all(upload_dir).await?;

    info!("✅ Upload directory is ready");

    Ok(Arc::new(LocalStorageService::new(upload_dir)))
}
