use volunteer_map_core::models::{MapRegion, DEFAULT_REGION};
use volunteer_map_core::sync::MapViewport;

/// Terminal stand-in for the map: remembers the region it was fitted to
pub struct TerminalViewport {
    region: MapRegion,
    fitted: bool,
}

impl TerminalViewport {
    pub fn new() -> Self {
        Self {
            region: DEFAULT_REGION,
            fitted: false,
        }
    }

    pub fn region(&self) -> &MapRegion {
        &self.region
    }

    pub fn was_fitted(&self) -> bool {
        self.fitted
    }
}

impl Default for TerminalViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl MapViewport for TerminalViewport {
    fn fit_to_region(&mut self, region: &MapRegion) {
        self.region = *region;
        self.fitted = true;
    }
}
