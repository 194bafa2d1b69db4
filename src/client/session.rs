// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client session state with change notification.

use tokio::sync::watch;

/// Who the client is acting for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user_id: Option<String>,
    /// Session JWT, sent as a bearer token when present
    pub token: Option<String>,
    pub logged_in: bool,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user_id: impl Into<String>, token: Option<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            token,
            logged_in: true,
        }
    }

    /// Logged in with a known user ID.
    pub fn is_authenticated(&self) -> bool {
        self.logged_in && self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Owns the current session and broadcasts changes to subscribers.
pub struct SessionContext {
    tx: watch::Sender<Session>,
}

impl SessionContext {
    pub fn new(initial: Session) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn log_in(&self, user_id: impl Into<String>, token: Option<String>) {
        let session = Session::authenticated(user_id, token);
        tracing::debug!(user_id = ?session.user_id, "Session logged in");
        self.tx.send_replace(session);
    }

    pub fn log_out(&self) {
        tracing::debug!("Session logged out");
        self.tx.send_replace(Session::anonymous());
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(Session::anonymous())
    }
}
