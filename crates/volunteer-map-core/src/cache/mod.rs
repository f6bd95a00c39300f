//! Local caching module for offline data access.
//!
//! `CacheManager` keeps a JSON snapshot of the last successful fetch per
//! resource key in a `KeyValueStore`. `get_from_network_first` is the single
//! read path: it tries the network and falls back to the snapshot.
//!
//! Snapshots never expire and are not invalidated when data is created.

pub mod manager;
pub mod read_through;

pub use manager::{CacheManager, CachedData, EVENTS_KEY};
pub use read_through::get_from_network_first;
