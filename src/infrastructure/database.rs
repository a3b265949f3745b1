use crate::entities::{images, sessions, users};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", db_url);

    let db = connect(db_url).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    Ok(db)
}

pub async fn connect(db_url: &str) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(db_url);
    opt.max_connections(16)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    // sqlx enables `foreign_keys` on every SQLite connection it opens
    let db = Database::connect(opt).await?;

    Ok(db)
}

/// Creates the schema. Runs once at startup, before the listener accepts requests.
pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    info!("🔄 Running migrations...");

    // Order matters for foreign keys: Users -> Images, Users -> Sessions
    let stmts = vec![
        (
            "users",
            schema
                .create_table_from_entity(users::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "images",
            schema
                .create_table_from_entity(images::Entity)
                .if_not_exists()
                .to_owned(),
        ),
        (
            "sessions",
            schema
                .create_table_from_entity(sessions::Entity)
                .if_not_exists()
                .to_owned(),
        ),
    ];

    for (name, stmt) in stmts {
        let stmt = builder.build(&stmt);
        db.execute(stmt).await?;
        info!("   - Table '{}' checked/created", name);
    }

    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_images_created_at ON images(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_images_uploaded_by ON images(uploaded_by)",
        "CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id)",
    ];

    for query in indexes {
        db.execute_unprepared(query).await?;
        tracing::debug!("   - Executed schema update: {}", query);
    }

    Ok(())
}
