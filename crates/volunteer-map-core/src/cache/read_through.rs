use std::fmt::Display;
use std::future::Future;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::CacheManager;

/// Network first, cached snapshot as fallback.
///
/// Awaits `fetch`. A successful value is written under `key` (replacing any
/// previous snapshot) and returned. On failure the snapshot for `key` is
/// returned if there is one that still deserializes into `T`; otherwise the
/// original fetch error is returned.
///
/// Cache I/O problems never turn into errors here: a failed write is logged
/// and the fresh value still returned, and an unreadable snapshot counts as
/// no snapshot.
pub async fn get_from_network_first<T, E, F>(cache: &CacheManager, key: &str, fetch: F) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: Display,
    F: Future<Output = Result<T, E>>,
{
    match fetch.await {
        Ok(value) => {
            if let Err(e) = cache.save(key, &value) {
                warn!(cache = key, error = %e, "Failed to cache fresh data");
            }
            Ok(value)
        }
        Err(fetch_err) => match cache.load::<T>(key) {
            Ok(Some(cached)) => {
                warn!(
                    cache = key,
                    error = %fetch_err,
                    age = %cached.age_display(),
                    "Fetch failed, serving cached data"
                );
                Ok(cached.data)
            }
            Ok(None) => {
                debug!(cache = key, "Fetch failed and nothing cached");
                Err(fetch_err)
            }
            Err(e) => {
                debug!(cache = key, error = %e, "Fetch failed and cached data unreadable");
                Err(fetch_err)
            }
        },
    }
}
