use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::store::KeyValueStore;
use crate::utils::id::deserialize_id;

/// Store key holding the serialized `UserInfo`
pub const USER_INFO_KEY: &str = "userInfo";

/// Store key holding the access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl UserInfo {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// Credentials returned by a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub user: UserInfo,
    pub access_token: String,
}

/// An authenticated user.
///
/// Created by `login` (or `restore` from a previous run) and destroyed by
/// `logout`. Operations that need the user take the session explicitly.
/// Tokens are never refreshed and never checked for expiry.
#[derive(Debug, Clone)]
pub struct Session {
    data: SessionData,
}

impl Session {
    /// Authenticate and persist the session
    pub async fn login(
        api: &ApiClient,
        store: &dyn KeyValueStore,
        email: &str,
        password: &str,
    ) -> Result<Self> {
        let data = api.authenticate(email, password).await?;
        let session = Self::from_data(data);
        session.save(store)?;
        info!(user_id = %session.user_id(), "Session started");
        Ok(session)
    }

    pub fn from_data(data: SessionData) -> Self {
        Self { data }
    }

    /// Persist user info and token under their keys. Either both are
    /// written or neither is left behind.
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let user = serde_json::to_string(&self.data.user).context("Failed to serialize user info")?;
        let token = serde_json::to_string(&self.data.access_token)
            .context("Failed to serialize access token")?;
        store.set(USER_INFO_KEY, &user)?;
        if let Err(e) = store.set(ACCESS_TOKEN_KEY, &token) {
            if let Err(cleanup) = store.remove(USER_INFO_KEY) {
                warn!(error = %cleanup, "Failed to roll back user info");
            }
            return Err(e.context("Failed to save access token"));
        }
        Ok(())
    }

    /// Rebuild the session saved by a previous login.
    ///
    /// Ok(None) when either half is missing or cannot be parsed.
    pub fn restore(store: &dyn KeyValueStore) -> Result<Option<Self>> {
        let (Some(user), Some(token)) = (store.get(USER_INFO_KEY)?, store.get(ACCESS_TOKEN_KEY)?) else {
            return Ok(None);
        };

        let user: UserInfo = match serde_json::from_str(&user) {
            Ok(u) => u,
            Err(e) => {
                warn!(error = %e, "Failed to parse stored user info");
                return Ok(None);
            }
        };
        let access_token: String = match serde_json::from_str(&token) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "Failed to parse stored access token");
                return Ok(None);
            }
        };

        Ok(Some(Self::from_data(SessionData { user, access_token })))
    }

    /// End the session, removing user info and token together
    pub fn logout(self, store: &dyn KeyValueStore) -> Result<()> {
        store.remove_many(&[USER_INFO_KEY, ACCESS_TOKEN_KEY])?;
        info!(user_id = %self.user_id(), "Session ended");
        Ok(())
    }

    pub fn user(&self) -> &UserInfo {
        &self.data.user
    }

    pub fn user_id(&self) -> &str {
        &self.data.user.id
    }

    pub fn token(&self) -> &str {
        &self.data.access_token
    }

    /// An API client carrying this session's token, sharing `base`'s pool
    pub fn api(&self, base: &ApiClient) -> ApiClient {
        base.with_token(self.data.access_token.clone())
    }
}
