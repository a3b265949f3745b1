use crate::entities::{prelude::*, *};
use crate::services::storage::StorageService;
use chrono::Utc;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{Duration, sleep};

/// Periodically purges upload files no image row refers to, and expired sessions.
pub struct BackgroundWorker {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    interval: Duration,
    grace: chrono::Duration,
    shutdown: watch::Receiver<bool>,
}

impl BackgroundWorker {
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<dyn StorageService>,
        interval_secs: u64,
        grace_secs: u64,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            db,
            storage,
            interval: Duration::from_secs(interval_secs.max(1)),
            // Out-of-range grace periods mean "never old enough"
            grace: i64::try_from(grace_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX),
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("🚀 Background worker started (every {:?})", self.interval);

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("🛑 Background worker shutting down");
                    break;
                }
                _ = sleep(self.interval) => {
                    self.perform_cleanup().await;
                }
            }
        }
    }

    async fn perform_cleanup(&self) {
        match self.sweep_orphans().await {
            Ok(0) => tracing::debug!("No orphaned uploads found"),
            Ok(n) => tracing::info!("🧹 Removed {} orphaned upload(s)", n),
            Err(e) => tracing::error!("❌ Orphan sweep failed: {:?}", e),
        }

        match self.purge_expired_sessions().await {
            Ok(0) => {}
            Ok(n) => tracing::info!("🧹 Purged {} expired session(s)", n),
            Err(e) => tracing::error!("❌ Session purge failed: {:?}", e),
        }
    }

    /// Deletes files older than the grace period that have no `images` row, and
    /// stale staging copies. Younger files may belong to an upload still in flight.
    pub async fn sweep_orphans(&self) -> anyhow::Result<usize> {
        let Some(cutoff) = Utc::now().checked_sub_signed(self.grace) else {
            return Ok(0);
        };
        let candidates: Vec<_> = self
            .storage
            .list_files()
            .await?
            .into_iter()
            .filter(|f| f.modified <= cutoff)
            .collect();

        if candidates.is_empty() {
            return Ok(0);
        }

        let referenced: HashSet<String> = Images::find()
            .select_only()
            .column(images::Column::Filename)
            .into_tuple::<String>()
            .all(&self.db)
            .await?
            .into_iter()
            .collect();

        let mut removed = 0;
        for file in candidates {
            // A staging copy this old belongs to an upload that died before its rename
            let result = if file.partial {
                self.storage.discard_partial(&file.key).await
            } else if referenced.contains(&file.key) {
                continue;
            } else {
                self.storage.delete_file(&file.key).await
            };
            match result {
                Ok(()) => {
                    tracing::info!("🗑️  Purged orphaned upload '{}' ({} bytes)", file.key, file.size);
                    removed += 1;
                }
                Err(e) => tracing::warn!("⚠️  Could not purge '{}': {}", file.key, e),
            }
        }

        Ok(removed)
    }

    pub async fn purge_expired_sessions(&self) -> anyhow::Result<u64> {
        let res = Sessions::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }
}
