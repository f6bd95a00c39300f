use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use futures::future::BoxFuture;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{image_part, ImageUploader};
use crate::api::ApiError;

/// Upload endpoint of freeimage.host
pub const DEFAULT_IMAGE_HOST_URL: &str = "https://freeimage.host/api/1/upload";

/// Uploads can be large; give them more room than JSON calls.
const UPLOAD_TIMEOUT_SECS: u64 = 120;

/// Both the success and the failure shape of the host's response
#[derive(Debug, Deserialize)]
struct HostResponse {
    status_code: Option<u16>,
    #[serde(default)]
    status_txt: Option<String>,
    #[serde(default)]
    image: Option<HostImage>,
    #[serde(default)]
    error: Option<HostError>,
}

#[derive(Debug, Deserialize)]
struct HostImage {
    display_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HostError {
    message: Option<String>,
}

/// Client for a freeimage.host-compatible image host
#[derive(Clone)]
pub struct FreeImageHost {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl FreeImageHost {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(UPLOAD_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    async fn upload(&self, path: &Path) -> Result<String> {
        let form = Form::new()
            .part("source", image_part(path).await?)
            .text("action", "upload")
            .text("type", "file")
            .text("key", self.api_key.clone());

        debug!(path = %path.display(), endpoint = %self.endpoint, "Uploading image");

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::NetworkError)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::NetworkError)?;

        let url = parse_host_response(status, &body).inspect_err(|e| {
            warn!(status = %status, error = %e, "Image upload failed");
        })?;
        debug!(url = %url, "Image uploaded");
        Ok(url)
    }
}

impl ImageUploader for FreeImageHost {
    fn upload_image<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.upload(path))
    }
}

/// Pull the public URL out of the host's reply.
///
/// The host may answer HTTP 200 with a failing `status_code` in the body, so
/// both are checked.
pub(crate) fn parse_host_response(status: reqwest::StatusCode, body: &str) -> Result<String, ApiError> {
    let parsed: Option<HostResponse> = serde_json::from_str(body).ok();

    let reason = |parsed: &Option<HostResponse>| -> String {
        parsed
            .as_ref()
            .and_then(|r| {
                r.status_txt
                    .clone()
                    .or_else(|| r.error.as_ref().and_then(|e| e.message.clone()))
            })
            .unwrap_or_else(|| "no details".to_string())
    };

    if !status.is_success() {
        return Err(ApiError::UploadFailed(format!(
            "Status {}: {}",
            status,
            reason(&parsed)
        )));
    }

    let Some(ref response) = parsed else {
        return Err(ApiError::UploadFailed("Malformed upload response".to_string()));
    };

    match response.status_code {
        Some(200) | None => {}
        Some(code) => {
            return Err(ApiError::UploadFailed(format!(
                "Status {}: {}",
                code,
                reason(&parsed)
            )));
        }
    }

    response
        .image
        .as_ref()
        .and_then(|image| image.display_url.clone())
        .ok_or_else(|| ApiError::UploadFailed("Response is missing image.display_url".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_parse_success() {
        let body = r#"{"status_code":200,"status_txt":"OK","image":{"display_url":"https://x/y.jpg"}}"#;
        assert_eq!(parse_host_response(StatusCode::OK, body).unwrap(), "https://x/y.jpg");
    }

    #[test]
    fn test_parse_failure_status_in_body() {
        let body = r#"{"status_code":400,"status_txt":"Bad Request","error":{"message":"Invalid API v1 key."}}"#;
        let err = parse_host_response(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, ApiError::UploadFailed(ref msg) if msg.contains("400") && msg.contains("Bad Request")));
    }

    #[test]
    fn test_parse_failure_http_status() {
        let body = r#"{"status_code":400,"error":{"message":"Invalid API v1 key."}}"#;
        let err = parse_host_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert!(matches!(err, ApiError::UploadFailed(ref msg) if msg.contains("Invalid API v1 key.")));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            parse_host_response(StatusCode::OK, "<html>"),
            Err(ApiError::UploadFailed(_))
        ));
        assert!(matches!(
            parse_host_response(StatusCode::OK, r#"{"status_code":200}"#),
            Err(ApiError::UploadFailed(_))
        ));
    }
}
