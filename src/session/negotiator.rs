//! Per-request session resolution.

use chrono::Utc;

use super::cookie::{SessionCookie, find_session_cookie};
use super::memory_store::session_prefix;
use super::{Session, SessionConfig, SessionStore};
use crate::SessionError;

/// How a request's session was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationOutcome {
    /// The cookie named a live session.
    Reused,
    /// No session cookie was sent; a new session was minted.
    Minted,
    /// The cookie named an unknown session; it was discarded and a new one minted.
    Replaced,
}

/// A resolved session plus the cookie to send back.
#[derive(Debug, Clone)]
pub struct Negotiated {
    pub session: Session,
    pub cookie: SessionCookie,
    pub outcome: NegotiationOutcome,
}

/// Maps an inbound cookie to a live session, minting one when needed.
///
/// Holds the shared store handle and the process-wide session config.
#[derive(Clone)]
pub struct SessionNegotiator<S> {
    store: S,
    config: SessionConfig,
}

impl<S> SessionNegotiator<S>
where
    S: SessionStore,
{
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Resolves the session for a request given its raw `Cookie` header values.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EntropyUnavailable` if a new session was needed
    /// and no id could be generated. Missing, malformed or unknown cookies are
    /// never errors.
    pub async fn negotiate<'a, I>(&self, cookie_headers: I) -> Result<Negotiated, SessionError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let candidate = find_session_cookie(cookie_headers, &self.config.cookie_name);
        self.negotiate_value(candidate.as_deref()).await
    }

    /// Resolves the session for an already-extracted cookie value.
    #[tracing::instrument(name = "negotiate_session", skip_all, err)]
    pub async fn negotiate_value(
        &self,
        candidate: Option<&str>,
    ) -> Result<Negotiated, SessionError> {
        if let Some(candidate) = candidate {
            if let Some(session) = self.store.get(candidate).await {
                let cookie = if self.config.sliding_expiration {
                    SessionCookie::issue(&session.id, &self.config, Utc::now())
                } else {
                    SessionCookie::echo(&self.config.cookie_name, candidate)
                };

                return Ok(Negotiated {
                    session,
                    cookie,
                    outcome: NegotiationOutcome::Reused,
                });
            }

            log::debug!(target: "visitor_session::negotiator", "msg=\"unknown session cookie discarded\" cookie_prefix=\"{}\"", session_prefix(candidate));
        }

        let outcome = if candidate.is_some() {
            NegotiationOutcome::Replaced
        } else {
            NegotiationOutcome::Minted
        };

        let session = self.mint().await?;
        let cookie = SessionCookie::issue(&session.id, &self.config, Utc::now());

        Ok(Negotiated {
            session,
            cookie,
            outcome,
        })
    }

    async fn mint(&self) -> Result<Session, SessionError> {
        let session_id = self.store.create().await.map_err(|e| {
            log::error!(target: "visitor_session::negotiator", "msg=\"session creation failed\" error=\"{e}\"");
            e
        })?;

        match self.store.get(&session_id).await {
            Some(session) => Ok(session),
            None => {
                // Only reachable if a sweep removed the session in between.
                log::warn!(target: "visitor_session::negotiator", "msg=\"new session vanished before lookup\" session_prefix=\"{}\"", session_prefix(&session_id));
                Ok(Session::new(session_id, Utc::now()))
            }
        }
    }
}
