//! Session ownership. The store is the only holder of the bearer token.

use std::{fmt, sync::Arc};

use parking_lot::RwLock;
use shared::{domain::UserProfile, protocol::TokenResponse};

#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(UserProfile::display_name)
            .unwrap_or("student")
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn establish(&self, response: TokenResponse) -> Session {
        let session = Session {
            token: SessionToken::new(response.access_token),
            user: response.user,
        };
        *self.inner.write() = Some(session.clone());
        session
    }

    pub fn clear(&self) {
        self.inner.write().take();
    }

    pub fn current(&self) -> Option<Session> {
        self.inner.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().is_some()
    }

    pub(crate) fn bearer(&self) -> Option<String> {
        self.inner
            .read()
            .as_ref()
            .map(|session| session.token.expose().to_string())
    }
}
