//! Server configuration loaded from environment variables.

use std::path::PathBuf;

use framegate_storage::S3Config;

/// Which object-storage backend to run against.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// Process-local map; development and tests only.
    Memory,
    /// Files under a root directory.
    Local { root: PathBuf },
    /// S3 or a MinIO-compatible endpoint.
    S3(S3Config),
}

/// All fields have defaults suitable for local development; override via
/// environment variables in production.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Object-storage backend selection.
    pub storage: StorageBackend,
    /// Classification endpoint URL.
    pub classifier_endpoint: String,
    /// Optional bearer token for the classification endpoint.
    pub classifier_token: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                          |
    /// |----------------------------------|----------------------------------|
    /// | `HOST`                           | `0.0.0.0`                        |
    /// | `PORT`                           | `3000`                           |
    /// | `CORS_ORIGINS`                   | `http://localhost:5173`          |
    /// | `FRAMEGATE_STORAGE`              | `local`                          |
    /// | `FRAMEGATE_STORAGE_ROOT`         | `./data`                         |
    /// | `FRAMEGATE_S3_BUCKET`            | (required for `s3`)              |
    /// | `FRAMEGATE_S3_REGION`            | `us-east-1`                      |
    /// | `FRAMEGATE_S3_ENDPOINT`          | unset (AWS)                      |
    /// | `FRAMEGATE_S3_PUBLIC_BASE_URL`   | (required for `s3`)              |
    /// | `FRAMEGATE_CLASSIFIER_URL`       | `http://localhost:8500/classify` |
    /// | `FRAMEGATE_CLASSIFIER_TOKEN`     | unset                            |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage = match std::env::var("FRAMEGATE_STORAGE").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            Ok("s3") => StorageBackend::S3(S3Config {
                bucket: std::env::var("FRAMEGATE_S3_BUCKET")
                    .expect("FRAMEGATE_S3_BUCKET must be set for s3 storage"),
                region: std::env::var("FRAMEGATE_S3_REGION")
                    .unwrap_or_else(|_| "us-east-1".into()),
                endpoint: std::env::var("FRAMEGATE_S3_ENDPOINT").ok(),
                public_base_url: std::env::var("FRAMEGATE_S3_PUBLIC_BASE_URL")
                    .expect("FRAMEGATE_S3_PUBLIC_BASE_URL must be set for s3 storage"),
            }),
            _ => StorageBackend::Local {
                root: std::env::var("FRAMEGATE_STORAGE_ROOT")
                    .unwrap_or_else(|_| "./data".into())
                    .into(),
            },
        };

        let classifier_endpoint = std::env::var("FRAMEGATE_CLASSIFIER_URL")
            .unwrap_or_else(|_| "http://localhost:8500/classify".into());
        let classifier_token = std::env::var("FRAMEGATE_CLASSIFIER_TOKEN").ok();

        Self {
            host,
            port,
            cors_origins,
            storage,
            classifier_endpoint,
            classifier_token,
        }
    }
}
