//! Admin accounts and sessions

use std::time::{Duration, Instant};

use constant_time_eq::constant_time_eq;
use dashmap::DashMap;
use shot_reserve_core::{AdminAccount, Credentials, ServiceError, SessionGrant};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug)]
struct Session {
    email: String,
    created_at: Instant,
}

impl Session {
    #[inline]
    fn new(email: String) -> Self {
        Self {
            email,
            created_at: Instant::now(),
        }
    }

    #[inline]
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Sign-in and session bookkeeping
///
/// Sessions are kept outside the database lock, so validating one never waits
/// for a claim.
pub struct Auth {
    accounts: Vec<AdminAccount>,
    sessions: DashMap<Uuid, Session>,
    ttl: Duration,
}

impl Auth {
    /// Create the [`Auth`] for the given admin accounts
    pub fn new(accounts: Vec<AdminAccount>, ttl: Duration) -> Self {
        Self {
            accounts,
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Open a session for `credentials`
    ///
    /// Expired sessions of every admin are pruned first.
    pub fn sign_in(&self, credentials: &Credentials) -> Result<SessionGrant, ServiceError> {
        let email = credentials.email.trim();
        let account = self.accounts.iter().find(|acc| {
            acc.email.eq_ignore_ascii_case(email)
                && constant_time_eq(acc.password.as_bytes(), credentials.password.as_bytes())
        });
        let Some(account) = account else {
            warn!(email, "sign-in failed");
            return Err(ServiceError::InvalidCredentials);
        };

        self.sessions.retain(|_, s| !s.is_expired(self.ttl));

        let session_id = Uuid::new_v4();
        self.sessions
            .insert(session_id, Session::new(account.email.clone()));
        info!(email = %account.email, "signed in");
        Ok(SessionGrant {
            session_id,
            email: account.email.clone(),
        })
    }

    /// Resolve `session` to the email of its owner
    ///
    /// Expired sessions are dropped on lookup.
    pub fn verify(&self, session: Option<Uuid>) -> Result<String, ServiceError> {
        let id = session.ok_or(ServiceError::Unauthorized)?;
        if self
            .sessions
            .remove_if(&id, |_, s| s.is_expired(self.ttl))
            .is_some()
        {
            info!("session expired");
            return Err(ServiceError::Unauthorized);
        }
        self.sessions
            .get(&id)
            .map(|s| s.email.clone())
            .ok_or(ServiceError::Unauthorized)
    }

    /// Revoke `session`, returning whether it existed
    pub fn sign_out(&self, session: Uuid) -> bool {
        match self.sessions.remove(&session) {
            Some((_, s)) => {
                info!(email = %s.email, "signed out");
                true
            }
            None => false,
        }
    }

    /// Number of stored sessions, including expired ones not pruned yet
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
