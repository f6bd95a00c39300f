//! Core library for volunteer-map.
//!
//! Talks to the volunteer events API and an image host, keeps a local
//! snapshot of the last event list for offline use, and holds the session
//! of the logged-in user.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod imagehost;
pub mod models;
pub mod store;
pub mod sync;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, Session, UserInfo};
pub use cache::{get_from_network_first, CacheManager, CachedData};
pub use config::{Config, ImageProvider};
pub use imagehost::{FreeImageHost, ImageDetails, ImageUploader};
pub use models::{Event, EventDraft, MapRegion, NewEvent, Position};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use sync::{sync_events, upcoming_events, EventSource, MapViewport};
