//! In-memory user accounts and sessions.
//!
//! Stands in for the user service's persistence so the auth endpoints have
//! something to check against. Credentials are compared verbatim.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct Account {
    password: String,
}

#[derive(Debug, Default)]
pub struct Accounts {
    users: DashMap<String, Account>,
    sessions: DashMap<String, String>,
    failures: DashMap<String, u64>,
    next_session: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccountError {
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, email: &str, password: &str) -> Result<(), AccountError> {
        match self.users.entry(email.to_ascii_lowercase()) {
            Entry::Occupied(_) => Err(AccountError::EmailTaken),
            Entry::Vacant(v) => {
                v.insert(Account {
                    password: password.to_string(),
                });
                Ok(())
            }
        }
    }

    /// Opens a session and returns its token.
    pub fn login(&self, email: &str, password: &str) -> Result<String, AccountError> {
        let email = email.to_ascii_lowercase();
        let ok = self
            .users
            .get(&email)
            .is_some_and(|a| a.password == password);
        if !ok {
            return Err(AccountError::InvalidCredentials);
        }
        let n = self.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        let token = format!("sess-{n:016x}");
        self.sessions.insert(token.clone(), email);
        Ok(token)
    }

    pub fn logout(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Counts one failed login from `ip` and returns the running total.
    /// The increment and read happen under the entry lock, so concurrent
    /// failures each see a distinct total.
    pub fn record_failure(&self, ip: &str) -> u64 {
        let mut n = self.failures.entry(ip.to_string()).or_insert(0);
        *n += 1;
        *n
    }
}
