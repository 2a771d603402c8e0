//! Configuration for the ReAuth service.

use std::time::Duration;

use reauth_core::{InternalSecret, SessionConfig};
use reauth_extension::CorsPolicy;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Secret that authorizes session creation
    pub internal_secret: InternalSecret,

    /// Session lifetime and cache residency
    pub session: SessionConfig,

    /// CORS allow-sets before extensions widen them
    pub cors: CorsPolicy,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Database
        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections = parse_or(&var, "DB_MAX_CONNECTIONS", 10)?;

        // Server port
        let http_port = parse_or(&var, "HTTP_PORT", 8080)?;

        // Internal secret (the shipped placeholder is refused)
        let internal_secret = var("REAUTH_INTERNAL_SECRET")
            .map(InternalSecret::new)
            .ok_or(ConfigError::Missing("REAUTH_INTERNAL_SECRET"))?;
        if internal_secret.is_insecure_default() {
            return Err(ConfigError::InsecureSecret);
        }

        // Sessions
        let valid_for_secs: u64 = parse_or(&var, "SESSION_VALID_FOR_SECS", 1800)?;
        let residency_secs: u64 = parse_or(&var, "SESSION_CACHE_RESIDENCY_SECS", 3600)?;
        if valid_for_secs == 0 {
            return Err(ConfigError::Invalid("SESSION_VALID_FOR_SECS"));
        }
        if residency_secs == 0 {
            return Err(ConfigError::Invalid("SESSION_CACHE_RESIDENCY_SECS"));
        }
        let session = SessionConfig::new()
            .with_valid_for(Duration::from_secs(valid_for_secs))
            .with_cache_residency(Duration::from_secs(residency_secs));

        // CORS: a variable that is set replaces its default set
        let defaults = CorsPolicy::default();
        let mut cors = CorsPolicy::empty();
        match var("CORS_ALLOWED_METHODS") {
            Some(list) => split_list(&list).for_each(|m| cors.allow_method(m)),
            None => defaults.methods().for_each(|m| cors.allow_method(m)),
        }
        match var("CORS_ALLOWED_HEADERS") {
            Some(list) => split_list(&list).for_each(|h| cors.allow_header(h)),
            None => defaults.headers().for_each(|h| cors.allow_header(h)),
        }
        match var("CORS_ALLOWED_HOSTS") {
            Some(list) => split_list(&list).for_each(|h| cors.allow_host(h)),
            None => defaults.hosts().for_each(|h| cors.allow_host(h)),
        }

        Ok(Self {
            http_port,
            database_url,
            db_max_connections,
            internal_secret,
            session,
            cors,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match var(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("REAUTH_INTERNAL_SECRET is empty or the default placeholder; change it, otherwise reauth can be compromised")]
    InsecureSecret,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/reauth"),
        ("REAUTH_INTERNAL_SECRET", "s3cret"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.db_max_connections, 10);
        assert_eq!(config.session.valid_for, Duration::from_secs(1800));
        assert_eq!(config.session.cache_residency, Duration::from_secs(3600));
        assert_eq!(config.cors, CorsPolicy::default());
        assert!(config.internal_secret.matches_header("s3cret"));
    }

    #[test]
    fn test_missing_required() {
        assert!(matches!(
            load(&[REQUIRED[1]]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
        assert!(matches!(
            load(&[REQUIRED[0]]),
            Err(ConfigError::Missing("REAUTH_INTERNAL_SECRET"))
        ));
    }

    #[test]
    fn test_placeholder_secret_refused() {
        let result = load(&[
            REQUIRED[0],
            ("REAUTH_INTERNAL_SECRET", InternalSecret::INSECURE_DEFAULT),
        ]);
        assert!(matches!(result, Err(ConfigError::InsecureSecret)));

        let result = load(&[REQUIRED[0], ("REAUTH_INTERNAL_SECRET", "  ")]);
        assert!(matches!(result, Err(ConfigError::InsecureSecret)));
    }

    #[test]
    fn test_invalid_numbers() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("HTTP_PORT", "eighty"));
        assert!(matches!(load(&vars), Err(ConfigError::Invalid("HTTP_PORT"))));

        let mut vars = REQUIRED.to_vec();
        vars.push(("SESSION_VALID_FOR_SECS", "0"));
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid("SESSION_VALID_FOR_SECS"))
        ));
    }

    #[test]
    fn test_cors_lists_replace_defaults() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("CORS_ALLOWED_HOSTS", "app.example.com, ,admin.example.com"));
        vars.push(("CORS_ALLOWED_METHODS", "get,post"));
        let config = load(&vars).unwrap();

        assert_eq!(
            config.cors.hosts().collect::<Vec<_>>(),
            ["admin.example.com", "app.example.com"]
        );
        assert_eq!(config.cors.methods().collect::<Vec<_>>(), ["GET", "POST"]);
        assert_eq!(
            config.cors.headers().collect::<Vec<_>>(),
            ["authorization", "content-type"]
        );
    }
}
