pub mod api;
pub mod config;
pub mod crypto;
pub mod logging;
pub mod session;

pub use config::{AppConfig, Environment, LoggingConfig, ServerConfig};
pub use session::{
    InMemorySessionStore, Negotiated, NegotiationOutcome, SameSite, Session, SessionConfig,
    SessionCookie, SessionNegotiator, SessionStore, SessionSweeper,
};

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The operating system's random source could not produce bytes.
    EntropyUnavailable(String),
    /// Configuration could not be loaded or failed validation.
    Config(String),
}

impl std::error::Error for SessionError {}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EntropyUnavailable(msg) => {
                write!(f, "Entropy source unavailable: {}", msg)
            }
            SessionError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}
