use std::env;
use std::path::PathBuf;

/// Runtime configuration for the gallery server
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string (default: "sqlite://gallery.db?mode=rwc")
    pub database_url: String,

    /// Directory holding uploaded image files (default: "static/uploads")
    pub upload_dir: PathBuf,

    /// Maximum upload request size in bytes (default: 16 MB)
    pub max_upload_size: usize,

    /// JWT Secret Key used to sign session tokens
    pub jwt_secret: String,

    /// Session lifetime in hours (default: 24)
    pub session_ttl_hours: i64,

    /// Mark the session cookie `Secure` (default: false)
    pub secure_cookies: bool,

    /// Seconds between orphan sweeps, 0 disables the sweeper (default: 3600)
    pub orphan_sweep_interval_secs: u64,

    /// Minimum age of an unreferenced file before it is purged (default: 600)
    pub orphan_grace_secs: u64,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

/// Positive hour counts that still fit a `chrono::Duration`.
fn parse_session_ttl_hours(raw: &str) -> Option<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|h| *h > 0 && chrono::Duration::try_hours(*h).is_some())
}

/// Second counts that still fit a `chrono::Duration`.
fn parse_grace_secs(raw: &str) -> Option<u64> {
    let secs = raw.trim().parse::<u64>().ok()?;
    let signed = i64::try_from(secs).ok()?;
    chrono::Duration::try_seconds(signed).map(|_| secs)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://gallery.db?mode=rwc".to_string(),
            upload_dir: PathBuf::from("static/uploads"),
            max_upload_size: 16 * 1024 * 1024, // 16 MB
            jwt_secret: "secret".to_string(),
            session_ttl_hours: 24,
            secure_cookies: false,
            orphan_sweep_interval_secs: 3600,
            orphan_grace_secs: 600,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            jwt_secret: env::var("JWT_SECRET").unwrap_or(default.jwt_secret),

            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| parse_session_ttl_hours(&v))
                .unwrap_or(default.session_ttl_hours),

            secure_cookies: env::var("SECURE_COOKIES")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(default.secure_cookies),

            orphan_sweep_interval_secs: env::var("ORPHAN_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.orphan_sweep_interval_secs),

            orphan_grace_secs: env::var("ORPHAN_GRACE_SECS")
                .ok()
                .and_then(|v| parse_grace_secs(&v))
                .unwrap_or(default.orphan_grace_secs),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),
        }
    }

    /// Create config for development and tests (no sweeper, throwaway secret)
    pub fn development() -> Self {
        Self {
            jwt_secret: "development-secret".to_string(),
            orphan_sweep_interval_secs: 0,
            ..Self::default()
        }
    }

    /// Warn about settings that are only acceptable outside production
    pub fn warn_insecure_defaults(&self) {
        if self.jwt_secret == Self::default().jwt_secret {
            tracing::warn!("⚠️  JWT_SECRET is not set, sessions are signed with the default key");
        }
        if !self.secure_cookies {
            tracing::debug!("Session cookie is not marked Secure");
        }
    }
}
