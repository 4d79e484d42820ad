use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{config::UploadConfig, evidence::Capture, protocol::Coordinate};

/// Why an upload did not produce a public URL.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The image host answered with a non-success status.
    #[error("{0}")]
    Rejected(String),
    /// The request never completed.
    #[error("Upload failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Success status, but no URL in the body.
    #[error("Upload response did not contain an image URL")]
    MalformedResponse,
}

/// Public URL of an uploaded evidence photo.
///
/// Only [`ImageHost::upload`] produces these, so holding one proves the upload succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    url: String,
}

impl UploadedImage {
    pub(crate) fn new(url: String) -> Self {
        Self { url }
    }

    /// Public URL of the uploaded photo.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Unsigned multipart uploads to a Cloudinary-compatible image host.
pub struct ImageHost {
    client: Client,
    config: UploadConfig,
}

impl ImageHost {
    /// An uploader for the host described by `config`.
    pub fn new(config: UploadConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Upload the capture's JPEG once. There is no retry; the caller decides.
    pub async fn upload(
        &self,
        capture: &Capture,
        coordinate: Option<&Coordinate>,
    ) -> Result<UploadedImage, UploadError> {
        let file = Part::bytes(capture.bytes().to_vec())
            .file_name(capture.file_name().to_string())
            .mime_str("image/jpeg")?;

        let mut form = Form::new()
            .part("file", file)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("folder", self.config.folder.clone());
        if let Some(coordinate) = coordinate {
            form = form.text("context", coordinate.upload_context());
        }

        let url = self.config.upload_url();
        info!(
            %url,
            file_name = capture.file_name(),
            size_kb = %format!("{:.1}", capture.bytes().len() as f64 / 1024.0),
            "Uploading evidence photo"
        );

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        #[derive(Deserialize, Default)]
        struct HostError {
            message: Option<String>,
        }

        #[derive(Deserialize, Default)]
        struct Response {
            secure_url: Option<String>,
            url: Option<String>,
            error: Option<HostError>,
        }

        let parsed: Response = serde_json::from_slice(&body).unwrap_or_default();

        if !status.is_success() {
            let message = parsed
                .error
                .and_then(|e| e.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Upload failed ({})", status.as_u16()));
            warn!(status = status.as_u16(), %message, "Image host rejected upload");
            return Err(UploadError::Rejected(message));
        }

        let image_url = parsed
            .secure_url
            .or(parsed.url)
            .filter(|u| !u.is_empty())
            .ok_or(UploadError::MalformedResponse)?;

        info!(url = %image_url, "Uploaded evidence photo");
        Ok(UploadedImage::new(image_url))
    }
}
