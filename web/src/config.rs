//! Configuration management for the web service.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Values that are present but unusable abort start-up with a
//! [`ConfigError`] instead of silently falling back.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info,starter_web=debug,tower_http=debug";

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
        /// What was expected
        reason: &'static str,
    },
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    /// Local development
    Development,
    /// Automated tests
    Test,
    /// Production deployment
    Production,
}

impl std::str::FromStr for AppEnvironment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Deployment environment (`APP_ENV`)
    pub environment: AppEnvironment,
    /// Application identity
    pub app: AppConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// API surface configuration
    pub api: ApiConfig,
    /// Tracing filter (`RUST_LOG`)
    pub log_filter: String,
    /// Seed the repository with the demo todos (`SEED_DEMO_TODOS`)
    pub seed_demo_todos: bool,
}

/// Application identity
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Display name (`APP_NAME`)
    pub name: String,
    /// Public URL (`APP_URL`)
    pub url: String,
}

/// Server configuration
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Host to bind to (`HOST`)
    pub host: String,
    /// Port to bind to (`PORT`)
    pub port: u16,
    /// Graceful shutdown timeout in seconds (`SHUTDOWN_TIMEOUT`)
    pub shutdown_timeout: u64,
}

/// API configuration
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// Mount point of the API routes (`API_BASE_PATH`), no trailing slash
    pub base_path: String,
    /// Client request timeout in milliseconds (`API_TIMEOUT_MS`)
    pub timeout_ms: u64,
    /// Origins allowed to call the API cross-site (`CORS_ALLOWED_ORIGINS`)
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = parse(&lookup, "APP_ENV", AppEnvironment::Development, |v| {
            v.parse().map_err(|()| "expected development, test or production")
        })?;

        let port = parse(&lookup, "PORT", 3000, |v| {
            v.parse::<u16>().map_err(|_| "expected a port number")
        })?;

        let shutdown_timeout = parse(&lookup, "SHUTDOWN_TIMEOUT", 30, |v| {
            v.parse::<u64>().map_err(|_| "expected a number of seconds")
        })?;

        let timeout_ms = parse(&lookup, "API_TIMEOUT_MS", 10_000, |v| match v.parse::<u64>() {
            Ok(0) | Err(_) => Err("expected a positive number of milliseconds"),
            Ok(ms) => Ok(ms),
        })?;

        let seed_demo_todos = parse(&lookup, "SEED_DEMO_TODOS", true, |v| {
            match v.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err("expected true or false"),
            }
        })?;

        let base_path = parse(&lookup, "API_BASE_PATH", "/api".to_string(), |v| {
            if v.starts_with('/') {
                Ok(v.trim_end_matches('/').to_string())
            } else {
                Err("must start with '/'")
            }
        })?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            environment,
            app: AppConfig {
                name: var("APP_NAME", "Starter Todos"),
                url: var("APP_URL", "http://localhost:3000"),
            },
            server: ServerConfig {
                host: var("HOST", "0.0.0.0"),
                port,
                shutdown_timeout,
            },
            api: ApiConfig {
                base_path,
                timeout_ms,
                cors_allowed_origins,
            },
            log_filter: var("RUST_LOG", DEFAULT_LOG_FILTER),
            seed_demo_todos,
        })
    }

    /// Address the server binds to, as `host:port`
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Client request timeout
    #[must_use]
    pub const fn api_timeout(&self) -> Duration {
        Duration::from_millis(self.api.timeout_ms)
    }

    /// Graceful shutdown timeout
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: AppEnvironment::Development,
            app: AppConfig {
                name: "Starter Todos".to_string(),
                url: "http://localhost:3000".to_string(),
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                shutdown_timeout: 30,
            },
            api: ApiConfig {
                base_path: "/api".to_string(),
                timeout_ms: 10_000,
                cors_allowed_origins: Vec::new(),
            },
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            seed_demo_todos: true,
        }
    }
}

/// Reads `key`, returning `default` when unset and an error when `convert` rejects it
fn parse<T, L, C>(lookup: &L, key: &'static str, default: T, convert: C) -> Result<T, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    C: FnOnce(&str) -> Result<T, &'static str>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => convert(value.trim()).map_err(|reason| ConfigError::Invalid {
            var: key,
            value,
            reason,
        }),
    }
}
