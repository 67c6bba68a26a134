use std::fmt;
use std::str::FromStr;

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    None,
    #[default]
    Lax,
    Strict,
}

impl SameSite {
    pub fn as_str(self) -> &'static str {
        match self {
            SameSite::None => "None",
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SameSite::None),
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            other => Err(format!(
                "invalid same-site policy '{other}', must be one of: lax, strict, none"
            )),
        }
    }
}

/// Cookie and lifetime settings for visitor sessions.
///
/// Loaded once at startup and never reloaded.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Lifetime of a freshly minted cookie; also the idle limit used by the sweeper.
    pub max_age: Duration,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    /// How often the sweeper runs. Zero disables sweeping.
    pub cleanup_interval: Duration,
    /// Re-issue the cookie with a fresh expiry when an existing session is reused.
    pub sliding_expiration: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session_id".to_owned(),
            max_age: Duration::hours(24),
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
            cleanup_interval: Duration::hours(1),
            sliding_expiration: false,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.cookie_name.is_empty() {
            return Err("session cookie name must not be empty".to_owned());
        }
        if !is_cookie_token(&self.cookie_name) {
            return Err(format!(
                "session cookie name '{}' contains characters not allowed in a cookie name",
                self.cookie_name
            ));
        }
        if self.max_age <= Duration::zero() {
            return Err(format!(
                "session max age must be positive, got {}s",
                self.max_age.num_seconds()
            ));
        }
        if self.cleanup_interval < Duration::zero() {
            return Err("session cleanup interval must not be negative".to_owned());
        }
        if self.same_site == SameSite::None && !self.secure {
            return Err("same-site none requires secure cookies".to_owned());
        }
        Ok(())
    }
}

/// RFC 6265 `token`: visible ASCII minus separators.
fn is_cookie_token(name: &str) -> bool {
    name.bytes().all(|b| {
        b.is_ascii_graphic()
            && !matches!(
                b,
                b'(' | b')'
                    | b'<'
                    | b'>'
                    | b'@'
                    | b','
                    | b';'
                    | b':'
                    | b'\\'
                    | b'"'
                    | b'/'
                    | b'['
                    | b']'
                    | b'?'
                    | b'='
                    | b'{'
                    | b'}'
            )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "session_id");
        assert_eq!(config.max_age, Duration::hours(24));
        assert!(!config.secure);
        assert!(config.http_only);
        assert_eq!(config.same_site, SameSite::Lax);
        assert!(!config.sliding_expiration);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_site_parse() {
        assert_eq!("lax".parse::<SameSite>(), Ok(SameSite::Lax));
        assert_eq!("Strict".parse::<SameSite>(), Ok(SameSite::Strict));
        assert_eq!(" NONE ".parse::<SameSite>(), Ok(SameSite::None));
        assert!("sometimes".parse::<SameSite>().is_err());
    }

    #[test]
    fn test_validate_empty_cookie_name() {
        let config = SessionConfig {
            cookie_name: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_cookie_name_with_separator() {
        let config = SessionConfig {
            cookie_name: "session;id".to_owned(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_non_positive_max_age() {
        let config = SessionConfig {
            max_age: Duration::zero(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_same_site_none_requires_secure() {
        let insecure = SessionConfig {
            same_site: SameSite::None,
            secure: false,
            ..Default::default()
        };
        assert!(insecure.validate().is_err());

        let secure = SessionConfig {
            same_site: SameSite::None,
            secure: true,
            ..Default::default()
        };
        assert!(secure.validate().is_ok());
    }
}
