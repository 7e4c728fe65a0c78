use crate::domain::value_objects::GameRules;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/impostor.db";
const DEFAULT_JWT_SECRET: &str = "impostor-secret-key-change-in-production";
const DEFAULT_TOKEN_TTL_SECONDS: u64 = 24 * 60 * 60;
const DEFAULT_PORT: u16 = 9999;
const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Server configuration, read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
    pub port: u16,
    /// Buffered events per subscriber before the oldest are dropped
    pub event_capacity: usize,
    pub rules: GameRules,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            port: DEFAULT_PORT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            rules: GameRules::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup; unset or unparsable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("DB_PATH"))
            .map(|url| normalize_database_url(&url))
            .unwrap_or(defaults.database_url);

        Self {
            database_url,
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_seconds: lookup("TOKEN_TTL_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.token_ttl_seconds),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            event_capacity: lookup("EVENT_CAPACITY")
                .and_then(|v| v.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(defaults.event_capacity),
            rules: defaults.rules,
        }
    }

    /// Private in-memory store, used by tests and demos
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            ..Self::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }

    /// Filesystem path of the database file, if there is one
    pub fn database_path(&self) -> Option<&str> {
        if self.is_in_memory() {
            return None;
        }
        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        path.split('?').next().filter(|p| !p.is_empty())
    }
}

/// Ensure the URL has the sqlite: scheme
fn normalize_database_url(url: &str) -> String {
    if url.starts_with("sqlite:") {
        url.to_string()
    } else {
        format!("sqlite:{}", url)
    }
}
