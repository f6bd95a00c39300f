//! Data models for volunteer events.
//!
//! - `Event`, `NewEvent`: events as listed by and sent to the API
//! - `EventDraft`: raw form input for creating an event
//! - `Position`, `MapRegion`: map geometry for markers and viewport fitting

pub mod draft;
pub mod event;
pub mod map;

pub use draft::{EventDraft, ValidationError};
pub use event::{Event, NewEvent, VolunteerError};
pub use map::{MapRegion, Position, DEFAULT_REGION, EDGE_PADDING};
