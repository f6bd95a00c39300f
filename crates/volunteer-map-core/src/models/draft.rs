//! Event creation form state.
//!
//! Validation only checks that every field is filled in. Values are parsed
//! when the draft is turned into a request body, never range-checked.

use thiserror::Error;

use super::event::NewEvent;
use super::map::Position;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {field} is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub time: String,
    pub latitude: String,
    pub longitude: String,
    pub volunteers_needed: String,
    /// Public URL of the uploaded image
    pub image_url: Option<String>,
}

impl EventDraft {
    fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("name", self.name.as_str()),
            ("description", self.description.as_str()),
            ("date", self.date.as_str()),
            ("time", self.time.as_str()),
            ("latitude", self.latitude.as_str()),
            ("longitude", self.longitude.as_str()),
            ("volunteers_needed", self.volunteers_needed.as_str()),
        ]
    }

    /// First field that is still empty, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        self.fields()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
            .or_else(|| {
                let has_image = self
                    .image_url
                    .as_deref()
                    .map(|u| !u.trim().is_empty())
                    .unwrap_or(false);
                (!has_image).then_some("image")
            })
    }

    pub fn is_complete(&self) -> bool {
        self.missing_field().is_none()
    }

    /// `{date}T{time}:00.000Z`
    pub fn date_time(&self) -> String {
        format!("{}T{}:00.000Z", self.date.trim(), self.time.trim())
    }

    /// Build the request body. The draft is left as-is so a failed submit
    /// can be retried.
    pub fn to_new_event(&self, organizer_id: &str) -> Result<NewEvent, ValidationError> {
        if let Some(field) = self.missing_field() {
            return Err(ValidationError::MissingField(field));
        }

        let latitude = parse_number::<f64>("latitude", &self.latitude)?;
        let longitude = parse_number::<f64>("longitude", &self.longitude)?;
        let volunteers_needed = parse_number::<u32>("volunteers_needed", &self.volunteers_needed)?;

        Ok(NewEvent {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            date_time: self.date_time(),
            position: Position::new(latitude, longitude),
            volunteers_needed,
            volunteers_ids: Vec::new(),
            image_url: self.image_url.clone(),
            organizer_id: organizer_id.to_string(),
        })
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> EventDraft {
        EventDraft {
            name: "Beach cleanup".to_string(),
            description: "Bring gloves".to_string(),
            date: "2030-01-01".to_string(),
            time: "09:30".to_string(),
            latitude: "-3.73".to_string(),
            longitude: "-38.52".to_string(),
            volunteers_needed: "5".to_string(),
            image_url: Some("https://x/y.jpg".to_string()),
        }
    }

    #[test]
    fn test_complete_draft() {
        let draft = complete_draft();
        assert!(draft.is_complete());

        let event = draft.to_new_event("user-1").unwrap();
        assert_eq!(event.date_time, "2030-01-01T09:30:00.000Z");
        assert_eq!(event.position, Position::new(-3.73, -38.52));
        assert_eq!(event.volunteers_needed, 5);
        assert!(event.volunteers_ids.is_empty());
        assert_eq!(event.organizer_id, "user-1");
        assert_eq!(event.image_url.as_deref(), Some("https://x/y.jpg"));
    }

    #[test]
    fn test_missing_fields() {
        let mut draft = complete_draft();
        draft.time = "  ".to_string();
        assert!(!draft.is_complete());
        assert_eq!(
            draft.to_new_event("u"),
            Err(ValidationError::MissingField("time"))
        );

        let mut draft = complete_draft();
        draft.image_url = None;
        assert_eq!(draft.missing_field(), Some("image"));

        assert_eq!(EventDraft::default().missing_field(), Some("name"));
    }

    #[test]
    fn test_invalid_number() {
        let mut draft = complete_draft();
        draft.volunteers_needed = "lots".to_string();
        assert!(draft.is_complete());
        assert!(matches!(
            draft.to_new_event("u"),
            Err(ValidationError::InvalidNumber { field: "volunteers_needed", .. })
        ));
    }

    #[test]
    fn test_failed_conversion_keeps_draft() {
        let mut draft = complete_draft();
        draft.latitude = "north".to_string();
        let before = draft.clone();
        assert!(draft.to_new_event("u").is_err());
        assert_eq!(draft, before);
    }
}
