//! Event list synchronization for the map.
//!
//! Each sync re-fetches the whole list through the read-through cache,
//! keeps the events that have not started yet, and fits the map viewport
//! to what is left.

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::cache::{get_from_network_first, CacheManager, EVENTS_KEY};
use crate::models::{Event, MapRegion};

/// Where the full event list comes from
pub trait EventSource: Send + Sync {
    fn list_events(&self) -> BoxFuture<'_, Result<Vec<Event>>>;
}

impl EventSource for ApiClient {
    fn list_events(&self) -> BoxFuture<'_, Result<Vec<Event>>> {
        Box::pin(ApiClient::list_events(self))
    }
}

/// The map the events are shown on
pub trait MapViewport {
    fn fit_to_region(&mut self, region: &MapRegion);
}

/// Events starting at or after `now`, in their original order
pub fn upcoming_events(events: Vec<Event>, now: DateTime<Utc>) -> Vec<Event> {
    events.into_iter().filter(|e| e.is_upcoming(now)).collect()
}

/// Fetch (or fall back to the cached list), filter to upcoming events and
/// fit `viewport` around them. With no upcoming events the viewport is left
/// where it is.
pub async fn sync_events<S, V>(
    source: &S,
    cache: &CacheManager,
    viewport: &mut V,
    now: DateTime<Utc>,
) -> Result<Vec<Event>>
where
    S: EventSource + ?Sized,
    V: MapViewport + ?Sized,
{
    let all = get_from_network_first(cache, EVENTS_KEY, source.list_events()).await?;
    let total = all.len();

    let events = upcoming_events(all, now);
    info!(total, upcoming = events.len(), "Events synchronized");

    match MapRegion::bounding(events.iter().map(|e| e.position)) {
        Some(region) => viewport.fit_to_region(&region),
        None => debug!("No upcoming events, viewport unchanged"),
    }

    Ok(events)
}
