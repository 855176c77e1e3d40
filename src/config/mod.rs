use std::env;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while assembling [`AppConfig`] at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub statement_timeout_ms: u64,
}

impl DatabaseConfig {
    /// Upper bound on any single store call
    pub fn statement_timeout(&self) -> Duration {
        Duration::from_millis(self.statement_timeout_ms)
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub api_key: ApiKey,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DocsConfig {
    /// Server URL advertised in the OpenAPI document
    pub base_url: String,
}

/// The shared secret every caller must present. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([redacted])")
    }
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Presets first, then specific variables on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup)
    }

    /// Replace the listening port, keeping the development docs URL in step.
    pub fn with_port(mut self, port: u16) -> Self {
        self.api.port = port;
        if self.environment == Environment::Development {
            self.docs.base_url = local_base_url(port);
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("API_KEY").ok_or(ConfigError::Missing("API_KEY"))?;
        if api_key.is_empty() {
            return Err(ConfigError::Invalid { key: "API_KEY", value: "<empty>".to_string() });
        }
        self.security.api_key = ApiKey::new(api_key);

        self.database.url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        // Database overrides
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", v)?;
        }
        if let Some(v) = lookup("DATABASE_STATEMENT_TIMEOUT_MS") {
            self.database.statement_timeout_ms = parse("DATABASE_STATEMENT_TIMEOUT_MS", v)?;
        }

        // API overrides
        if let Some(v) = lookup("HOST") {
            self.api.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.api.port = parse("PORT", v)?;
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse("SECURITY_ENABLE_CORS", v)?;
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self.docs.base_url = match (self.environment, lookup("PUBLIC_BASE_URL")) {
            (_, Some(v)) => {
                url::Url::parse(&v).map_err(|_| ConfigError::Invalid { key: "PUBLIC_BASE_URL", value: v.clone() })?;
                v.trim_end_matches('/').to_string()
            }
            (Environment::Development, None) => local_base_url(self.api.port),
            (_, None) => return Err(ConfigError::Missing("PUBLIC_BASE_URL")),
        };

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 10,
                connection_timeout: 30,
                statement_timeout_ms: 30_000,
            },
            api: ApiConfig { host: "0.0.0.0".to_string(), port: 3000 },
            security: SecurityConfig {
                api_key: ApiKey::new(""),
                enable_cors: true,
                cors_origins: vec![],
            },
            docs: DocsConfig { base_url: local_base_url(3000) },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 20,
                connection_timeout: 10,
                statement_timeout_ms: 10_000,
            },
            api: ApiConfig { host: "0.0.0.0".to_string(), port: 3000 },
            security: SecurityConfig {
                api_key: ApiKey::new(""),
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            docs: DocsConfig { base_url: String::new() },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
                statement_timeout_ms: 5_000,
            },
            api: ApiConfig { host: "0.0.0.0".to_string(), port: 3000 },
            security: SecurityConfig {
                api_key: ApiKey::new(""),
                enable_cors: false,
                cors_origins: vec![],
            },
            docs: DocsConfig { base_url: String::new() },
        }
    }
}

fn local_base_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[("API_KEY", "s3cret"), ("DATABASE_URL", "postgres://localhost/orders")];

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.docs.base_url, "http://localhost:3000");
        assert_eq!(config.security.api_key, ApiKey::new("s3cret"));
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/orders")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("API_KEY")));

        let err = AppConfig::from_lookup(lookup(&[("API_KEY", ""), ("DATABASE_URL", "postgres://x/y")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "API_KEY", .. }));
    }

    #[test]
    fn test_production_requires_public_base_url() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_ENV", "production"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PUBLIC_BASE_URL")));

        pairs.push(("PUBLIC_BASE_URL", "https://api.example.com/"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.docs.base_url, "https://api.example.com");
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn test_port_override_moves_local_docs_url() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "8080"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.docs.base_url, "http://localhost:8080");

        let config = config.with_port(9090);
        assert_eq!(config.docs.base_url, "http://localhost:9090");
    }

    #[test]
    fn test_statement_timeout_override() {
        let config = AppConfig::from_lookup(lookup(REQUIRED)).unwrap();
        assert_eq!(config.database.statement_timeout(), Duration::from_secs(30));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("DATABASE_STATEMENT_TIMEOUT_MS", "1500"));
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.database.statement_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = AppConfig::from_lookup(lookup(REQUIRED)).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("s3cret"));
    }
}
