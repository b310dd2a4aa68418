use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Loaded once at startup and injected into handlers through `AppState`;
/// nothing reads the environment after boot.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root directory for uploaded files (default: `uploads`).
    /// Petition images land under `<dir>/petitions`, evidence under
    /// `<dir>/evidence`.
    pub upload_dir: PathBuf,
    /// Shared secret gating admin self-registration. Required; there is no
    /// hardcoded fallback.
    pub admin_setup_secret: String,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Required | Default                 |
    /// |------------------------|----------|-------------------------|
    /// | `HOST`                 | no       | `0.0.0.0`               |
    /// | `PORT`                 | no       | `3000`                  |
    /// | `CORS_ORIGINS`         | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`                    |
    /// | `UPLOAD_DIR`           | no       | `uploads`               |
    /// | `ADMIN_SETUP_SECRET`   | **yes**  | --                      |
    ///
    /// # Panics
    ///
    /// Panics if `ADMIN_SETUP_SECRET` (or the JWT secret, see
    /// [`JwtConfig::from_env`]) is missing or empty -- misconfiguration
    /// should fail at boot, not at first use.
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

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));

        let admin_setup_secret = std::env::var("ADMIN_SETUP_SECRET")
            .expect("ADMIN_SETUP_SECRET must be set in the environment");
        assert!(
            !admin_setup_secret.is_empty(),
            "ADMIN_SETUP_SECRET must not be empty"
        );

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload_dir,
            admin_setup_secret,
            jwt,
        }
    }
}
