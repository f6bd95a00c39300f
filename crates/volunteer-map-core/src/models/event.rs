use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::map::Position;
use crate::utils::format::truncate_string;
use crate::utils::id::{deserialize_id, deserialize_optional_id};

/// Longest event name shown on a marker line
const MARKER_NAME_MAX: usize = 40;

/// Outcome of a rejected volunteer request. State is never mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VolunteerError {
    #[error("You have already volunteered for this event")]
    AlreadyVolunteered,

    #[error("Sorry, this event is already full")]
    EventFull,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    // Absent until the server has persisted the event
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_id"
    )]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "dateTime")]
    pub date_time: String,
    pub position: Position,
    #[serde(rename = "volunteersNeeded", default)]
    pub volunteers_needed: u32,
    #[serde(rename = "volunteersIds", default)]
    pub volunteers_ids: Vec<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "organizerId", default, deserialize_with = "deserialize_id")]
    pub organizer_id: String,
}

/// Body of `POST /eventsData`: an event without a server-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    #[serde(rename = "dateTime")]
    pub date_time: String,
    pub position: Position,
    #[serde(rename = "volunteersNeeded")]
    pub volunteers_needed: u32,
    #[serde(rename = "volunteersIds")]
    pub volunteers_ids: Vec<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "organizerId")]
    pub organizer_id: String,
}

impl Event {
    /// Parse the start time. Returns None when the server sent something
    /// that is not an ISO-8601 date or date-time.
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_date_time(&self.date_time)
    }

    /// True when the event starts at or after `now`. Unparseable dates never are.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.starts_at().map(|start| start >= now).unwrap_or(false)
    }

    pub fn volunteer_count(&self) -> usize {
        self.volunteers_ids.len()
    }

    pub fn remaining_spots(&self) -> u32 {
        let taken = u32::try_from(self.volunteers_ids.len()).unwrap_or(u32::MAX);
        self.volunteers_needed.saturating_sub(taken)
    }

    pub fn is_full(&self) -> bool {
        self.remaining_spots() == 0
    }

    pub fn has_volunteer(&self, user_id: &str) -> bool {
        self.volunteers_ids.iter().any(|id| id == user_id)
    }

    /// Add `user_id` to the volunteer list.
    ///
    /// This is a local change only: the server is not told and the cached
    /// snapshot is left as it was. An existing volunteer is reported before
    /// a full event, so re-applying the same id always yields
    /// `AlreadyVolunteered`.
    pub fn volunteer(&mut self, user_id: &str) -> Result<(), VolunteerError> {
        if self.has_volunteer(user_id) {
            return Err(VolunteerError::AlreadyVolunteered);
        }
        if self.is_full() {
            return Err(VolunteerError::EventFull);
        }
        self.volunteers_ids.push(user_id.to_string());
        Ok(())
    }

    pub fn status_text(&self) -> String {
        if self.is_full() {
            "Team is full".to_string()
        } else {
            format!(
                "{} of {} Volunteer(s) needed",
                self.volunteer_count(),
                self.volunteers_needed
            )
        }
    }

    pub fn share_message(&self) -> String {
        format!(
            "Check out this event: {}\n{}\nDate & Time: {}",
            self.name, self.description, self.date_time
        )
    }

    /// Readable start time: "Jan 01, 2030 @ 09:30 AM"
    pub fn formatted_datetime(&self) -> String {
        match self.starts_at() {
            Some(dt) => dt.format("%b %d, %Y @ %I:%M %p").to_string(),
            None => self.date_time.chars().take(16).collect(),
        }
    }

    /// Short label used on the map marker line
    pub fn marker_label(&self) -> String {
        format!(
            "{} ({:.4}, {:.4})",
            truncate_string(&self.name, MARKER_NAME_MAX),
            self.position.latitude, self.position.longitude
        )
    }
}

/// Local date-time layouts accepted when no offset is given
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// ISO-8601 with an offset, without one, or date only. Values without an
/// offset are read as UTC; a bare date is midnight UTC.
fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
