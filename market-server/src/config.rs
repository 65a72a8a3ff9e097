//! Market server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Market server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// PostgreSQL connection URL (absent = in-memory stores)
    pub database_url: Option<String>,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// Directory for daily rolling log files
    pub log_dir: Option<String>,
    /// Log level used when RUST_LOG is not set
    pub log_level: Option<String>,
    /// Bootstrap administrator account (email, password)
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        Self::require_secret_from(std::env::var(name).ok(), name, environment)
    }

    fn require_secret_from(
        value: Option<String>,
        name: &str,
        environment: &str,
    ) -> Result<String, BoxError> {
        let val = match value {
            Some(v) => v,
            None => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            log_level: std::env::var("LOG_LEVEL").ok().filter(|s| !s.is_empty()),
            admin_email: std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
            environment,
        })
    }

    /// Configuration for tests and local tooling: in-memory stores, fixed secret
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            environment: "development".into(),
            http_port: 0,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            log_dir: None,
            log_level: None,
            admin_email: None,
            admin_password: None,
        }
    }
}
