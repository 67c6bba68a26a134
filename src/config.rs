//! Application configuration.
//!
//! Configuration is assembled once at startup: environment-specific defaults
//! are selected by `ENV`, then individual values are overridden from
//! environment variables (and a `.env` file, if present).
//!
//! # Example
//!
//! ```rust
//! use visitor_session::config::{AppConfig, Environment};
//! use chrono::Duration;
//!
//! // Defaults for a given environment
//! let config = AppConfig::for_environment(Environment::Production);
//! assert!(config.session.secure);
//!
//! // Or customize
//! let mut config = AppConfig::development();
//! config.session.max_age = Duration::hours(1);
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::Duration;

use crate::SessionError;
use crate::session::{SameSite, SessionConfig};

/// Deployment environment, selected by the `ENV` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parses an environment name. Anything unrecognised is development.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main configuration struct.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Limit on receiving a request body.
    ///
    /// Default: 30 seconds
    pub read_timeout: Duration,

    /// Limit on producing a response.
    ///
    /// Default: 30 seconds
    pub write_timeout: Duration,

    /// Grace period for in-flight requests after a shutdown signal.
    ///
    /// Default: 30 seconds
    pub shutdown_timeout: Duration,

    /// Directory served under `/static`.
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "invalid log level '{other}', must be one of: debug, info, warn, error"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            other => Err(format!(
                "invalid log format '{other}', must be one of: json, text"
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

impl AppConfig {
    /// Local development: plain HTTP, lax cookies, human-readable debug logs.
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "localhost".to_owned(),
                port: 9779,
                read_timeout: Duration::seconds(30),
                write_timeout: Duration::seconds(30),
                shutdown_timeout: Duration::seconds(30),
                static_dir: PathBuf::from("static"),
            },
            session: SessionConfig {
                cookie_name: "session_id".to_owned(),
                max_age: Duration::hours(24),
                secure: false,
                http_only: true,
                same_site: SameSite::Lax,
                cleanup_interval: Duration::hours(1),
                sliding_expiration: false,
            },
            logging: LoggingConfig {
                level: LogLevel::Debug,
                format: LogFormat::Text,
            },
        }
    }

    /// Staging: HTTPS-only strict cookies, JSON logs.
    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_owned(),
                port: 8080,
                ..Self::development().server
            },
            session: SessionConfig {
                secure: true,
                same_site: SameSite::Strict,
                cleanup_interval: Duration::minutes(30),
                ..Self::development().session
            },
            logging: LoggingConfig {
                level: LogLevel::Info,
                format: LogFormat::Json,
            },
        }
    }

    /// Production: as staging, with a tighter sweep interval.
    pub fn production() -> Self {
        let staging = Self::staging();
        Self {
            environment: Environment::Production,
            session: SessionConfig {
                cleanup_interval: Duration::minutes(15),
                ..staging.session
            },
            ..staging
        }
    }

    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self::development(),
            Environment::Staging => Self::staging(),
            Environment::Production => Self::production(),
        }
    }

    /// Loads configuration from the process environment and an optional `.env` file.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if a value cannot be used or the result
    /// fails validation.
    pub fn from_env() -> Result<Self, SessionError> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration using `lookup` to read variables.
    ///
    /// Empty values are treated as unset. Unparseable numbers, booleans and
    /// durations are ignored with a warning; unknown enum values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENV")
            .map(|name| Environment::from_name(&name))
            .unwrap_or_default();
        let mut config = Self::for_environment(environment);

        if let Some(v) = var("SERVER_HOST") {
            config.server.host = v;
        }
        override_parsed(&var, "SERVER_PORT", &mut config.server.port);
        override_duration(&var, "SERVER_READ_TIMEOUT", &mut config.server.read_timeout);
        override_duration(&var, "SERVER_WRITE_TIMEOUT", &mut config.server.write_timeout);
        override_duration(
            &var,
            "SERVER_SHUTDOWN_TIMEOUT",
            &mut config.server.shutdown_timeout,
        );
        if let Some(v) = var("SERVER_STATIC_DIR") {
            config.server.static_dir = PathBuf::from(v);
        }

        if let Some(v) = var("SESSION_COOKIE_NAME") {
            config.session.cookie_name = v;
        }
        override_duration(&var, "SESSION_MAX_AGE", &mut config.session.max_age);
        override_parsed(&var, "SESSION_SECURE", &mut config.session.secure);
        override_parsed(&var, "SESSION_HTTP_ONLY", &mut config.session.http_only);
        if let Some(v) = var("SESSION_SAME_SITE") {
            config.session.same_site = v.parse().map_err(SessionError::Config)?;
        }
        override_duration(
            &var,
            "SESSION_CLEANUP_INTERVAL",
            &mut config.session.cleanup_interval,
        );
        override_parsed(
            &var,
            "SESSION_SLIDING_EXPIRATION",
            &mut config.session.sliding_expiration,
        );

        if let Some(v) = var("LOG_LEVEL") {
            config.logging.level = v.parse().map_err(SessionError::Config)?;
        }
        if let Some(v) = var("LOG_FORMAT") {
            config.logging.format = v.parse().map_err(SessionError::Config)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.server.port == 0 {
            return Err(SessionError::Config(
                "server port must be between 1 and 65535, got 0".to_owned(),
            ));
        }
        if self.server.read_timeout < Duration::zero() {
            return Err(SessionError::Config(
                "server read timeout must not be negative".to_owned(),
            ));
        }
        if self.server.write_timeout < Duration::zero() {
            return Err(SessionError::Config(
                "server write timeout must not be negative".to_owned(),
            ));
        }
        if self.server.shutdown_timeout < Duration::zero() {
            return Err(SessionError::Config(
                "server shutdown timeout must not be negative".to_owned(),
            ));
        }
        self.session.validate().map_err(SessionError::Config)
    }

    /// Returns the `host:port` pair to bind.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn override_parsed<F, T>(var: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + fmt::Debug,
{
    if let Some(value) = var(key) {
        match value.trim().parse() {
            Ok(parsed) => *target = parsed,
            Err(_) => {
                log::warn!(target: "visitor_session::config", "msg=\"invalid value for environment variable\" key=\"{key}\" value=\"{value}\" using_default=\"{target:?}\"");
            }
        }
    }
}

fn override_duration<F>(var: &F, key: &str, target: &mut Duration)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = var(key) {
        match parse_duration(&value) {
            Some(parsed) => *target = parsed,
            None => {
                log::warn!(target: "visitor_session::config", "msg=\"invalid duration for environment variable\" key=\"{key}\" value=\"{value}\" using_default_secs={}", target.num_seconds());
            }
        }
    }
}

/// Parses a duration such as `24h`, `1h30m`, `90s`, `250ms` or `2d`.
///
/// A bare `0` is accepted; any other number needs a unit. Fractional and
/// negative values are rejected.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input == "0" {
        return Some(Duration::zero());
    }

    humantime::parse_duration(input)
        .ok()
        .and_then(|parsed| Duration::from_std(parsed).ok())
}
