//! Session cookie descriptor and `Cookie` header parsing.
//!
//! The descriptor carries everything needed to emit a `Set-Cookie` header.
//! A freshly issued cookie serializes as
//! `name=value; Expires=<RFC 1123>; Path=/; [HttpOnly; ][Secure; ]SameSite=<policy>`.
//! An echoed cookie carries only `name=value`, because an inbound `Cookie`
//! header never includes attributes.

use chrono::{DateTime, Utc};
use cookie::Cookie;

use super::config::{SameSite, SessionConfig};

/// Format used for the `Expires` attribute (RFC 1123, always GMT).
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub expires: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: Option<SameSite>,
}

impl SessionCookie {
    /// Builds a cookie for `session_id` from configuration, expiring at `now + max_age`.
    pub fn issue(session_id: &str, config: &SessionConfig, now: DateTime<Utc>) -> Self {
        Self {
            name: config.cookie_name.clone(),
            value: session_id.to_owned(),
            expires: Some(now + config.max_age),
            path: Some("/".to_owned()),
            http_only: config.http_only,
            secure: config.secure,
            same_site: Some(config.same_site),
        }
    }

    /// Re-emits an inbound cookie as received: name and value, nothing else.
    pub fn echo(name: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            value: value.to_owned(),
            expires: None,
            path: None,
            http_only: false,
            secure: false,
            same_site: None,
        }
    }

    /// Serializes the descriptor into a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut parts = vec![format!("{}={}", self.name, self.value)];

        if let Some(expires) = self.expires {
            parts.push(format!("Expires={}", expires.format(EXPIRES_FORMAT)));
        }
        if let Some(ref path) = self.path {
            parts.push(format!("Path={path}"));
        }
        if self.http_only {
            parts.push("HttpOnly".to_owned());
        }
        if self.secure {
            parts.push("Secure".to_owned());
        }
        if let Some(same_site) = self.same_site {
            parts.push(format!("SameSite={same_site}"));
        }

        parts.join("; ")
    }
}

/// Returns the value of the first cookie called `name` across all `Cookie` headers.
///
/// Unparseable pairs are skipped, so a malformed header reads as "no cookie".
/// Surrounding double quotes are stripped from the value.
pub fn find_session_cookie<'a, I>(cookie_headers: I, name: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    cookie_headers.into_iter().find_map(|header| {
        Cookie::split_parse(header)
            .filter_map(Result::ok)
            .find(|c| c.name() == name)
            .map(|c| c.value_trimmed().to_owned())
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap()
    }

    #[test]
    fn test_issue_full_header() {
        let config = SessionConfig {
            cookie_name: "session_id".to_owned(),
            max_age: Duration::hours(24),
            secure: true,
            http_only: true,
            same_site: SameSite::Strict,
            ..Default::default()
        };

        let cookie = SessionCookie::issue("abc123", &config, fixed_now());

        assert_eq!(
            cookie.to_header_value(),
            "session_id=abc123; Expires=Wed, 03 Jan 2024 15:04:05 GMT; Path=/; HttpOnly; Secure; SameSite=Strict"
        );
    }

    #[test]
    fn test_issue_without_flags() {
        let config = SessionConfig {
            secure: false,
            http_only: false,
            same_site: SameSite::Lax,
            max_age: Duration::minutes(30),
            ..Default::default()
        };

        let cookie = SessionCookie::issue("abc123", &config, fixed_now());

        assert_eq!(
            cookie.to_header_value(),
            "session_id=abc123; Expires=Tue, 02 Jan 2024 15:34:05 GMT; Path=/; SameSite=Lax"
        );
    }

    #[test]
    fn test_echo_has_no_attributes() {
        let cookie = SessionCookie::echo("session_id", "abc123");
        assert_eq!(cookie.expires, None);
        assert_eq!(cookie.to_header_value(), "session_id=abc123");
    }

    #[test]
    fn test_find_session_cookie() {
        let headers = ["theme=dark; session_id=abc123; lang=en"];
        assert_eq!(
            find_session_cookie(headers, "session_id"),
            Some("abc123".to_owned())
        );
    }

    #[test]
    fn test_find_session_cookie_first_wins() {
        let headers = ["session_id=first", "session_id=second"];
        assert_eq!(
            find_session_cookie(headers, "session_id"),
            Some("first".to_owned())
        );
    }

    #[test]
    fn test_find_session_cookie_absent() {
        assert_eq!(find_session_cookie(["theme=dark"], "session_id"), None);
        assert_eq!(find_session_cookie(std::iter::empty(), "session_id"), None);
    }

    #[test]
    fn test_find_session_cookie_strips_quotes() {
        let headers = ["theme=dark; session_id=\"abc123\""];
        assert_eq!(
            find_session_cookie(headers, "session_id"),
            Some("abc123".to_owned())
        );
    }

    #[test]
    fn test_find_session_cookie_skips_malformed_pairs() {
        let headers = ["=novalue; garbage; session_id=abc123"];
        assert_eq!(
            find_session_cookie(headers, "session_id"),
            Some("abc123".to_owned())
        );
    }
}
