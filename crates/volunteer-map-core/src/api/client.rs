//! API client for the volunteer events REST API.
//!
//! Every call is a single request/response round trip. Nothing is retried;
//! failures come back as `ApiError` inside the `anyhow::Error`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::{SessionData, UserInfo};
use crate::imagehost::image_part;
use crate::models::{Event, NewEvent};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL used when none is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/login";
const EVENTS_PATH: &str = "/eventsData";
const UPLOAD_PATH: &str = "/upload";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    image: UploadedImage,
}

#[derive(Debug, Deserialize)]
struct UploadedImage {
    display_url: String,
}

/// API client for the events backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client for `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send a request once and decode its JSON body
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = self
            .authorize(request)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ApiError::NetworkError)?;

        let response = Self::check_response(response).await?;

        let text = response
            .text()
            .await
            .map_err(ApiError::NetworkError)?;

        serde_json::from_str(&text).with_context(|| format!("Failed to parse {} response", what))
    }

    /// Authenticate with email and password and return the session credentials
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SessionData> {
        let request = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&LoginRequest { email, password });

        let auth: AuthResponse = self.send_json(request, "login").await?;
        info!(user_id = %auth.user.id, "Authenticated");

        Ok(SessionData {
            user: auth.user,
            access_token: auth.access_token,
        })
    }

    // ===== Events =====

    /// Fetch every event, in server order
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        let request = self.client.get(self.url(EVENTS_PATH));
        let events: Vec<Event> = self.send_json(request, "events").await?;
        debug!(count = events.len(), "Events fetched");
        Ok(events)
    }

    /// Create an event and return it as stored by the server
    pub async fn create_event(&self, event: &NewEvent) -> Result<Event> {
        let request = self.client.post(self.url(EVENTS_PATH)).json(event);
        let created: Event = self.send_json(request, "create event").await?;
        info!(id = ?created.id, name = %created.name, "Event created");
        Ok(created)
    }

    // ===== Upload =====

    /// Upload an image through the API's own `/upload` endpoint and return
    /// its public URL
    pub async fn upload_image(&self, path: &Path) -> Result<String> {
        let form = reqwest::multipart::Form::new().part("image", image_part(path).await?);
        let request = self.client.post(self.url(UPLOAD_PATH)).multipart(form);

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(ApiError::NetworkError)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UploadFailed(format!("Status {}: {}", status, body)).into());
        }

        let body = response.text().await.map_err(ApiError::NetworkError)?;
        Ok(parse_upload_response(&body)?)
    }
}

/// Extract `data.image.display_url` from the API upload response
pub(crate) fn parse_upload_response(body: &str) -> Result<String, ApiError> {
    let parsed: UploadResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::UploadFailed(format!("Malformed upload response: {}", e)))?;
    Ok(parsed.data.image.display_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let api = ApiClient::new("http://localhost:3333/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:3333");
        assert_eq!(api.url(EVENTS_PATH), "http://localhost:3333/eventsData");
    }

    #[test]
    fn test_with_token() {
        let api = ApiClient::new(DEFAULT_API_BASE_URL).unwrap();
        assert!(!api.has_token());
        let authed = api.with_token("tok".to_string());
        assert!(authed.has_token());
        assert_eq!(authed.base_url(), api.base_url());
    }

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"accessToken":"abc.def","user":{"id":3,"email":"a@b.c"}}"#;
        let resp: AuthResponse = serde_json::from_str(json).expect("Failed to parse auth JSON");
        assert_eq!(resp.access_token, "abc.def");
        assert_eq!(resp.user.id, "3");
        assert_eq!(resp.user.email, "a@b.c");
    }

    #[test]
    fn test_parse_upload_response() {
        let body = r#"{"data":{"image":{"display_url":"https://x/y.jpg"}}}"#;
        assert_eq!(parse_upload_response(body).unwrap(), "https://x/y.jpg");

        let err = parse_upload_response(r#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, ApiError::UploadFailed(_)));
    }
}
