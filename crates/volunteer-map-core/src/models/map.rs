use serde::{Deserialize, Serialize};

/// Relative padding added around the fitted events, as a fraction of the span.
pub const EDGE_PADDING: f64 = 0.2;

/// Smallest delta a fitted region can have, so a single marker is still
/// shown with some surrounding context.
pub const MIN_REGION_DELTA: f64 = 0.01;

/// Region shown before any events have been loaded.
pub const DEFAULT_REGION: MapRegion = MapRegion {
    latitude: -3.7319,
    longitude: -38.5267,
    latitude_delta: 0.1,
    longitude_delta: 0.1,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Bounding region of all positions, padded by `EDGE_PADDING`.
    /// Returns None when there is nothing to fit.
    pub fn bounding<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut iter = positions.into_iter();
        let first = iter.next()?;

        let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
        let (mut min_lng, mut max_lng) = (first.longitude, first.longitude);
        for p in iter {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        let lat_span = max_lat - min_lat;
        let lng_span = max_lng - min_lng;

        Some(Self {
            latitude: (min_lat + max_lat) / 2.0,
            longitude: (min_lng + max_lng) / 2.0,
            latitude_delta: (lat_span * (1.0 + 2.0 * EDGE_PADDING)).max(MIN_REGION_DELTA),
            longitude_delta: (lng_span * (1.0 + 2.0 * EDGE_PADDING)).max(MIN_REGION_DELTA),
        })
    }

    pub fn contains(&self, p: Position) -> bool {
        (p.latitude - self.latitude).abs() <= self.latitude_delta / 2.0
            && (p.longitude - self.longitude).abs() <= self.longitude_delta / 2.0
    }
}

impl std::fmt::Display for MapRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "center ({:.4}, {:.4}) span {:.4} x {:.4}",
            self.latitude, self.longitude, self.latitude_delta, self.longitude_delta
        )
    }
}
