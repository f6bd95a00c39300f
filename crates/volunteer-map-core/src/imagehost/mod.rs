//! Image hosting behind a narrow upload interface.
//!
//! Callers only see `ImageUploader::upload_image`, which turns a local file
//! into a public URL. `FreeImageHost` talks to a freeimage.host-compatible
//! service; `ApiClient` uploads through the events API's own endpoint.

pub mod freeimage;

use std::path::Path;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::multipart::Part;

use crate::api::ApiClient;
use crate::utils::format_file_size;

pub use freeimage::{FreeImageHost, DEFAULT_IMAGE_HOST_URL};

/// Name used when the path has no usable file name
const FALLBACK_FILE_NAME: &str = "upload.jpg";

pub trait ImageUploader: Send + Sync {
    /// Upload the image at `path` and return its public URL.
    fn upload_image<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String>>;
}

impl ImageUploader for ApiClient {
    fn upload_image<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String>> {
        Box::pin(ApiClient::upload_image(self, path))
    }
}

impl<U: ImageUploader + ?Sized> ImageUploader for Box<U> {
    fn upload_image<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<String>> {
        (**self).upload_image(path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string()
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Read `path` into a multipart file part
pub(crate) async fn image_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image: {}", path.display()))?;

    let part = Part::bytes(bytes)
        .file_name(file_name(path))
        .mime_str(mime_for(path))?;
    Ok(part)
}

/// Name and size of a picked image, for display next to the upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDetails {
    pub name: String,
    pub size: String,
}

impl ImageDetails {
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat image: {}", path.display()))?;
        Ok(Self {
            name: file_name(path),
            size: format_file_size(metadata.len()),
        })
    }
}

impl std::fmt::Display for ImageDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/tmp/cat.png")), "cat.png");
        assert_eq!(file_name(Path::new("/")), FALLBACK_FILE_NAME);
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("noext")), "image/jpeg");
    }

    #[test]
    fn test_image_details() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, vec![0u8; 1024 * 1024]).unwrap();

        let details = ImageDetails::from_path(&path).unwrap();
        assert_eq!(details.to_string(), "photo.jpg (1.00 MB)");
    }

    #[test]
    fn test_image_details_missing_file() {
        assert!(ImageDetails::from_path(&PathBuf::from("/definitely/not/here.jpg")).is_err());
    }

    #[tokio::test]
    async fn test_image_part_missing_file() {
        assert!(image_part(Path::new("/definitely/not/here.jpg")).await.is_err());
    }
}
