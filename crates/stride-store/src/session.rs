//! Session records: the signed-in user and the bearer token.

use stride_shared::constants::{KEY_AUTH_TOKEN, KEY_CURRENT_USER};
use stride_shared::models::User;

use crate::cache::LocalCache;
use crate::error::Result;

impl LocalCache {
    /// The cached user, or `None` when logged out or when the record is
    /// unreadable (the caller should send the user to the login screen).
    pub fn current_user(&self) -> Result<Option<User>> {
        self.get(KEY_CURRENT_USER)
    }

    pub fn set_current_user(&self, user: &User) -> Result<()> {
        self.set(KEY_CURRENT_USER, user)
    }

    pub fn auth_token(&self) -> Result<Option<String>> {
        self.get(KEY_AUTH_TOKEN)
    }

    pub fn set_auth_token(&self, token: &str) -> Result<()> {
        self.set(KEY_AUTH_TOKEN, token)
    }

    /// Forget the session. Both removals are broadcast.
    pub fn clear_session(&self) -> Result<()> {
        self.remove(KEY_CURRENT_USER)?;
        self.remove(KEY_AUTH_TOKEN)?;
        Ok(())
    }
}
