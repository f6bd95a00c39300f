//! Application state for the volunteer-map CLI.
//!
//! `App` wires configuration, local storage, the API client and the session
//! together. Each subcommand is one method and one network action at most.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

use volunteer_map_core::api::ApiClient;
use volunteer_map_core::auth::{CredentialStore, Session};
use volunteer_map_core::cache::{get_from_network_first, CacheManager, EVENTS_KEY};
use volunteer_map_core::config::{Config, ImageProvider};
use volunteer_map_core::imagehost::{FreeImageHost, ImageDetails, ImageUploader};
use volunteer_map_core::models::{Event, EventDraft, ValidationError, VolunteerError};
use volunteer_map_core::store::FileStore;
use volunteer_map_core::sync::sync_events;
use volunteer_map_core::utils::{events_found, format_optional};
use volunteer_map_core::ApiError;

use crate::cli::CreateArgs;
use crate::viewport::TerminalViewport;

/// Environment variable holding the login password
const ENV_PASSWORD: &str = "VOLUNTEER_MAP_PASSWORD";

pub struct App {
    config: Config,
    store: Arc<FileStore>,
    cache: CacheManager,
    api: ApiClient,
    session: Option<Session>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: Config, data_dir: PathBuf) -> Result<Self> {
        debug!(?data_dir, api = %config.api_base_url, "App::new() starting");

        let store = Arc::new(FileStore::new(data_dir)?);
        let cache = CacheManager::new(store.clone());

        let session = match Session::restore(store.as_ref()) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to restore session");
                None
            }
        };
        debug!(has_session = session.is_some(), "Session loaded");

        let base = ApiClient::new(config.api_base_url.clone())?;
        let api = match session {
            Some(ref s) => s.api(&base),
            None => base,
        };

        Ok(Self {
            config,
            store,
            cache,
            api,
            session,
        })
    }

    fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| anyhow!("Not logged in. Run `volunteer-map login` first."))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&mut self, email: Option<String>, remember: bool) -> Result<()> {
        let email = match email.or_else(|| self.config.last_email.clone()) {
            Some(e) => e,
            None => prompt_line("Email: ")?,
        };
        if email.is_empty() {
            return Err(anyhow!("Email and password required"));
        }

        let credentials = CredentialStore::for_api(&self.config.api_base_url);
        let password = match std::env::var(ENV_PASSWORD).ok().filter(|p| !p.is_empty()) {
            Some(p) => p,
            None => match credentials.password(&email) {
                Ok(Some(p)) => {
                    debug!("Using password from keychain");
                    p
                }
                Ok(None) => rpassword::prompt_password("Password: ")?,
                Err(e) => {
                    warn!(error = %e, "Keychain unavailable");
                    rpassword::prompt_password("Password: ")?
                }
            },
        };
        if password.is_empty() {
            return Err(anyhow!("Email and password required"));
        }

        let base = ApiClient::new(self.config.api_base_url.clone())?;
        let session = Session::login(&base, self.store.as_ref(), &email, &password).await?;

        if remember {
            if let Err(e) = credentials.remember(&email, &password) {
                warn!(error = %e, "Failed to store credentials");
            }
        }

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("Logged in as {}", session.user().display_name());
        self.api = session.api(&base);
        self.session = Some(session);
        Ok(())
    }

    pub fn logout(&mut self, forget: bool) -> Result<()> {
        match self.session.take() {
            Some(session) => {
                let email = session.user().email.clone();
                session.logout(self.store.as_ref())?;
                if forget {
                    let credentials = CredentialStore::for_api(&self.config.api_base_url);
                    match credentials.forget(&email) {
                        Ok(true) => println!("Forgot the remembered password"),
                        Ok(false) => debug!("No remembered password"),
                        Err(e) => warn!(error = %e, "Failed to delete stored credentials"),
                    }
                }
                println!("Logged out");
            }
            None => println!("Not logged in"),
        }
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Sync upcoming events and print them as markers
    pub async fn map(&self) -> Result<()> {
        let mut viewport = TerminalViewport::new();
        let events = sync_events(&self.api, &self.cache, &mut viewport, Utc::now()).await?;

        for event in &events {
            println!(
                "  * [{}] {}  {}",
                format_optional(event.id.as_deref(), "?"),
                event.marker_label(),
                event.formatted_datetime()
            );
        }
        if viewport.was_fitted() {
            println!("Map region: {}", viewport.region());
        }
        println!("{} (updated {})", events_found(events.len()), self.cache.events_age());
        Ok(())
    }

    /// Full event list from the network, or the cached copy when offline
    async fn load_events(&self) -> Result<Vec<Event>> {
        get_from_network_first(&self.cache, EVENTS_KEY, self.api.list_events()).await
    }

    async fn find_event(&self, id: &str) -> Result<Event> {
        self.load_events()
            .await?
            .into_iter()
            .find(|e| e.id.as_deref() == Some(id))
            .ok_or_else(|| anyhow!("No event with id {}", id))
    }

    pub async fn show(&self, id: &str) -> Result<()> {
        let event = self.find_event(id).await?;

        println!("{}", event.name);
        println!("organized by {}", event.organizer_id);
        println!();
        println!(
            "Image: {}",
            format_optional(event.image_url.as_deref(), "No image available")
        );
        println!("{}", event.description);
        println!();
        println!("When:   {}", event.formatted_datetime());
        println!(
            "Where:  {:.5}, {:.5}",
            event.position.latitude, event.position.longitude
        );
        println!("Status: {}", event.status_text());
        Ok(())
    }

    /// Volunteer the session user for an event. The change stays local.
    pub async fn volunteer(&self, id: &str) -> Result<()> {
        let session = self.require_session()?;
        let mut event = self.find_event(id).await?;

        match event.volunteer(session.user_id()) {
            Ok(()) => {
                info!(event = %event.name, "Volunteered");
                println!("Thank you for volunteering!");
                println!("You have successfully volunteered for \"{}\".", event.name);
            }
            Err(VolunteerError::AlreadyVolunteered) => {
                println!("Already volunteered: {}", VolunteerError::AlreadyVolunteered);
            }
            Err(VolunteerError::EventFull) => {
                println!("Event is full: {}", VolunteerError::EventFull);
            }
        }
        println!("{}", event.status_text());
        Ok(())
    }

    pub async fn share(&self, id: &str) -> Result<()> {
        let event = self.find_event(id).await?;
        println!("{}", event.share_message());
        Ok(())
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// The uploader picked by configuration
    fn uploader(&self) -> Result<Box<dyn ImageUploader>> {
        match self.config.image_provider {
            ImageProvider::FreeImage => {
                let key = self.config.image_host_key.clone().ok_or_else(|| {
                    anyhow!("No image host key configured (set VOLUNTEER_MAP_IMAGE_HOST_KEY)")
                })?;
                Ok(Box::new(FreeImageHost::new(self.config.image_host_url.clone(), key)?))
            }
            ImageProvider::Api => Ok(Box::new(self.api.clone())),
        }
    }

    async fn upload_image(&self, path: &Path) -> Result<String> {
        let details = ImageDetails::from_path(path)?;
        let url = self.uploader()?.upload_image(path).await?;
        println!("Uploaded {}", details);
        Ok(url)
    }

    pub async fn upload(&self, path: &Path) -> Result<()> {
        let url = self.upload_image(path).await?;
        println!("{}", url);
        Ok(())
    }

    pub async fn create(&self, args: CreateArgs) -> Result<()> {
        let session = self.require_session()?;

        let mut draft = EventDraft {
            name: args.name,
            description: args.description,
            date: args.date,
            time: args.time,
            latitude: args.latitude,
            longitude: args.longitude,
            volunteers_needed: args.volunteers,
            image_url: args.image_url,
        };

        // Do not upload anything for a form that cannot be submitted
        if let Some(field) = draft.missing_field().filter(|f| *f != "image") {
            return Err(ValidationError::MissingField(field).into());
        }

        if let Some(ref path) = args.image {
            draft.image_url = Some(self.upload_image(path).await?);
        }

        let new_event = draft.to_new_event(session.user_id())?;
        let created = self.api.create_event(&new_event).await?;

        println!(
            "Created event {} ({})",
            created.name,
            format_optional(created.id.as_deref(), "no id")
        );
        Ok(())
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Short message for the user
pub fn user_message(err: &anyhow::Error) -> String {
    if let Some(api_err) = err.downcast_ref::<ApiError>() {
        return match api_err {
            ApiError::Unauthorized => "Invalid email or password".to_string(),
            e if e.is_connectivity() => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::UploadFailed(msg) => format!(
                "Upload failed: {}. There was an issue uploading the image. Please try again.",
                msg
            ),
            other => other.to_string(),
        };
    }
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return validation.to_string();
    }
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_unauthorized() {
        let err: anyhow::Error = ApiError::Unauthorized.into();
        assert_eq!(user_message(&err), "Invalid email or password");
    }

    #[test]
    fn test_user_message_upload() {
        let err: anyhow::Error = ApiError::UploadFailed("Status 400".to_string()).into();
        assert!(user_message(&err).starts_with("Upload failed: Status 400"));
    }

    #[test]
    fn test_user_message_validation() {
        let err: anyhow::Error = ValidationError::MissingField("time").into();
        assert_eq!(user_message(&err), "Missing required field: time");
    }

    #[test]
    fn test_user_message_other() {
        let err = anyhow!("No event with id 9");
        assert_eq!(user_message(&err), "No event with id 9");
    }

    #[test]
    fn test_new_app_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(Config::default(), dir.path().to_path_buf()).unwrap();
        assert!(app.require_session().is_err());
        assert!(!app.api.has_token());
    }

    #[test]
    fn test_uploader_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::new(Config::default(), dir.path().to_path_buf()).unwrap();
        assert!(app.uploader().is_err());

        let config = Config {
            image_provider: ImageProvider::Api,
            ..Config::default()
        };
        let app = App::new(config, dir.path().to_path_buf()).unwrap();
        assert!(app.uploader().is_ok());
    }
}
