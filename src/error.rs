use thiserror::Error;

use crate::evidence::{CameraError, LocationError};
use crate::server::UploadError;
use crate::zone::Zone;

/// Result type alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Fallback message shown when the remote service gives no usable reason.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Every failure the client can surface.
///
/// Nothing here is fatal to the process: each variant maps to an inline message with a
/// retry or cancel path.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// An issue was submitted before its evidence photo reached the image host.
    #[error("Capture and upload an evidence photo before submitting.")]
    EvidenceNotUploaded,

    /// Capture was requested while no camera stream was live.
    #[error("Camera is not ready to capture.")]
    CameraNotReady,

    /// The camera could not be opened or read.
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// Location lookup failed. The capture flow never returns this; other callers may.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// Uploading the evidence photo failed.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The session token was rejected; stored credentials should be dropped.
    #[error("Session expired. Please log in again.")]
    Unauthorized,

    /// The operation requires a logged-in session.
    #[error("You need to log in first.")]
    NotLoggedIn,

    /// The current role may not perform this operation.
    #[error("Your role is not allowed to {0}.")]
    Forbidden(&'static str),

    /// A regional administrator tried to act on an issue outside their zone.
    #[error("Issue is in the {0} zone, outside the zones you oversee.")]
    OutsideZone(Zone),

    /// The remote API answered with a failure.
    #[error("{message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Image decode or encode failure.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a validation error from any message.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}
