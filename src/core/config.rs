use std::path::PathBuf;

/// Storefront configuration
///
/// # Environment variables
///
/// Every field can be overridden through the environment (a `.env` file is
/// honored when present):
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | ./work_dir | Database and log files |
/// | ENVIRONMENT | development | development \| test \| production |
/// | LOG_LEVEL | info | Default tracing filter |
/// | LOG_JSON | false | JSON log output instead of pretty |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the database and log files
    pub work_dir: PathBuf,
    /// Runtime environment: development | test | production
    pub environment: String,
    /// Default tracing filter, overridden by RUST_LOG
    pub log_level: String,
    /// Emit JSON logs instead of human-readable ones
    pub log_json: bool,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "./work_dir".into())
                .into(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Override the location-sensitive fields, keeping the rest from the
    /// environment. Used by tests to point at a temp dir.
    pub fn with_overrides(work_dir: impl Into<PathBuf>, environment: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.environment = environment.into();
        config
    }

    /// Path of the redb database file
    pub fn store_db_path(&self) -> PathBuf {
        self.work_dir.join("store.redb")
    }

    /// Directory for rolling log files
    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_test(&self) -> bool {
        self.environment == "test"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
