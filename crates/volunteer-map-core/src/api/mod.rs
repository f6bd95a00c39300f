//! REST API client module for the volunteer events backend.
//!
//! This module provides the `ApiClient` for logging in, listing events and
//! creating events. Authenticated requests carry the session's access token
//! as a bearer token.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_API_BASE_URL};
pub use error::ApiError;
