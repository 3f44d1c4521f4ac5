//! Sign-in state: who is logged in and which bearer token goes on requests.
//!
//! The signed-in user and the token live in the [`LocalCache`] so every
//! handle sharing the cache sees logins and logouts. The token is also pushed
//! into the [`RemoteClient`], whose clones share it.

use serde_json::Value;
use tracing::{info, warn};

use stride_shared::dto::{AuthResponse, LoginRequest, RegisterRequest, UserDto};
use stride_shared::models::User;
use stride_store::LocalCache;

use crate::error::{ClientError, Result};
use crate::mapping::{map_user, MediaResolver};
use crate::remote::RemoteClient;

#[derive(Clone)]
pub struct Session {
    remote: RemoteClient,
    cache: LocalCache,
    media: MediaResolver,
}

impl Session {
    pub fn new(remote: RemoteClient, cache: LocalCache, media: MediaResolver) -> Self {
        Self {
            remote,
            cache,
            media,
        }
    }

    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    pub fn cache(&self) -> &LocalCache {
        &self.cache
    }

    /// Pick up a session left in the cache by an earlier run.
    ///
    /// A missing or unreadable user record means logged out.
    pub fn restore(&self) -> Result<Option<User>> {
        let user = self.cache.current_user()?;
        let token = self.cache.auth_token()?;
        if user.is_some() {
            self.remote.set_token(token);
        } else {
            self.remote.set_token(None);
        }
        Ok(user)
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        Ok(self.cache.current_user()?)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "username and password are required".into(),
            ));
        }
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let value = self.remote.login(&request).await?;
        let user = self.establish(value)?;
        info!(user = %user.id, "logged in");
        Ok(user)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        if request.username.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            return Err(ClientError::Validation(
                "username, email and password are required".into(),
            ));
        }
        let value = self.remote.register(&request).await?;
        let user = self.establish(value)?;
        info!(user = %user.id, "registered");
        Ok(user)
    }

    pub fn logout(&self) -> Result<()> {
        self.cache.clear_session()?;
        self.remote.set_token(None);
        info!("logged out");
        Ok(())
    }

    /// Re-read the signed-in user from the backend and cache the result.
    pub async fn refresh_user(&self) -> Result<User> {
        let cached = self.cache.current_user()?.ok_or(ClientError::NotLoggedIn)?;
        let dto = self.remote.user(cached.id).await?;
        let user = map_user(&dto, &self.media);
        self.cache.set_current_user(&user)?;
        Ok(user)
    }

    /// Replace the cached user after a local edit (new avatar, new plan...).
    pub fn update_user(&self, user: &User) -> Result<()> {
        Ok(self.cache.set_current_user(user)?)
    }

    fn establish(&self, value: Value) -> Result<User> {
        let (dto, token) = decode_auth(value)?;
        let user = map_user(&dto, &self.media);
        self.cache.set_current_user(&user)?;
        match token.as_deref() {
            Some(token) => self.cache.set_auth_token(token)?,
            None => {
                warn!(user = %user.id, "auth response carried no token");
                self.cache.remove(stride_shared::constants::KEY_AUTH_TOKEN)?;
            }
        }
        self.remote.set_token(token);
        Ok(user)
    }
}

/// Accept `{ token, user }` as well as a bare user object.
fn decode_auth(value: Value) -> Result<(UserDto, Option<String>)> {
    if value.get("user").is_some_and(Value::is_object) {
        let auth: AuthResponse = serde_json::from_value(value)?;
        return Ok((auth.user, auth.token.filter(|t| !t.is_empty())));
    }
    let token = value
        .get("token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let user: UserDto = serde_json::from_value(value)?;
    Ok((user, token))
}
