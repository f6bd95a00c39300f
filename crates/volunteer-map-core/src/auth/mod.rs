//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `Session`: the logged-in user and access token, persisted in the
//!   local store under `userInfo` and `accessToken`
//! - `CredentialStore`: optional OS keychain passwords, per API backend

pub mod credentials;
pub mod session;

pub use credentials::{CredentialError, CredentialStore};
pub use session::{Session, SessionData, UserInfo, ACCESS_TOKEN_KEY, USER_INFO_KEY};
