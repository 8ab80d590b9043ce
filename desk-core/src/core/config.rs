/// Application configuration.
///
/// # Environment variables
///
/// Every field can be overridden through the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | STORE_URL | http://localhost:54321 | Remote store base URL |
/// | STORE_ANON_KEY | (empty) | Anonymous project key |
/// | WORK_DIR | /var/lib/memberdesk | Session credential and log directory |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout (milliseconds) |
/// | ENVIRONMENT | development | development \| staging \| production |
///
/// # Example
///
/// ```ignore
/// STORE_URL=https://project.example.co STORE_ANON_KEY=... memberdesk
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote store base URL; REST and auth endpoints hang off it.
    pub store_url: String,
    /// Anonymous project key, sent with every request.
    pub store_anon_key: String,
    /// Directory holding the persisted session credential and logs.
    pub work_dir: String,
    /// HTTP request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            store_url: std::env::var("STORE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".into()),
            store_anon_key: std::env::var("STORE_ANON_KEY").unwrap_or_default(),
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/memberdesk".into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the store endpoint and working directory. Used by tests.
    pub fn with_overrides(
        store_url: impl Into<String>,
        store_anon_key: impl Into<String>,
        work_dir: impl Into<String>,
    ) -> Self {
        let mut config = Self::from_env();
        config.store_url = store_url.into();
        config.store_anon_key = store_anon_key.into();
        config.work_dir = work_dir.into();
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_endpoint_and_work_dir() {
        let config = Config::with_overrides("http://store.test", "key-123", "/tmp/desk");
        assert_eq!(config.store_url, "http://store.test");
        assert_eq!(config.store_anon_key, "key-123");
        assert_eq!(config.work_dir, "/tmp/desk");
        assert_eq!(config.request_timeout_ms, 30000);
    }

    #[test]
    fn environment_helpers() {
        let mut config = Config::with_overrides("u", "k", "d");
        config.environment = "development".into();
        assert!(config.is_development());
        assert!(!config.is_production());

        config.environment = "production".into();
        assert!(config.is_production());
    }
}
