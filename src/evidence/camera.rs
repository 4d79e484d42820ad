use std::{future::Future, path::PathBuf};

use image::{DynamicImage, GenericImageView};
use thiserror::Error;
use tracing::{debug, info};

/// What to ask the camera for. Sizes are ideals; the device may negotiate lower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    /// Prefer the environment-facing lens.
    pub rear_facing: bool,
    /// Preferred frame width in pixels.
    pub ideal_width: u32,
    /// Preferred frame height in pixels.
    pub ideal_height: u32,
    /// Whether to capture audio as well.
    pub audio: bool,
}

impl CameraConstraints {
    /// Rear camera, 1280x720 ideal, video only.
    pub const EVIDENCE: CameraConstraints = CameraConstraints {
        rear_facing: true,
        ideal_width: 1280,
        ideal_height: 720,
        audio: false,
    };
}

/// Camera failures.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The user or platform refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,
    /// No camera is attached.
    #[error("no camera found")]
    NotFound,
    /// The stream was stopped before the frame was read.
    #[error("camera stream already stopped")]
    Stopped,
    /// The frame could not be read or decoded.
    #[error("could not read camera frame: {0}")]
    Frame(String),
}

impl CameraError {
    /// Message shown in the flow's error state.
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraError::PermissionDenied => {
                "Camera access denied. Please allow camera access and try again."
            }
            CameraError::NotFound => "No camera found on this device.",
            CameraError::Stopped | CameraError::Frame(_) => {
                "The camera stopped responding. Please try again."
            }
        }
    }
}

/// A live video stream. Holds the camera until [`VideoStream::stop`] is called.
pub trait VideoStream {
    /// Negotiated frame size.
    fn resolution(&self) -> (u32, u32);

    /// The frame currently shown in the preview.
    fn current_frame(&mut self) -> Result<DynamicImage, CameraError>;

    /// Stop every track and release the hardware. Idempotent.
    fn stop(&mut self);

    /// Whether the stream still holds the camera.
    fn is_live(&self) -> bool;
}

/// Something that can open a video stream.
pub trait CameraDevice {
    /// Stream type produced by this device.
    type Stream: VideoStream;

    /// Request a stream matching `constraints` as closely as possible.
    fn open(
        &self,
        constraints: &CameraConstraints,
    ) -> impl Future<Output = Result<Self::Stream, CameraError>>;
}

/// Serves a still image file as the camera's live frame.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    /// A camera whose every frame is the image at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CameraDevice for StillImageCamera {
    type Stream = StillImageStream;

    async fn open(&self, constraints: &CameraConstraints) -> Result<StillImageStream, CameraError> {
        let path = self.path.clone();
        if !path.exists() {
            return Err(CameraError::NotFound);
        }

        let frame = tokio::task::spawn_blocking(move || image::open(&path))
            .await
            .map_err(|e| CameraError::Frame(e.to_string()))?
            .map_err(|e| CameraError::Frame(e.to_string()))?;

        let (width, height) = frame.dimensions();
        info!(
            rear_facing = constraints.rear_facing,
            requested_width = constraints.ideal_width,
            requested_height = constraints.ideal_height,
            width,
            height,
            "Opened still-image camera"
        );

        Ok(StillImageStream { frame: Some(frame) })
    }
}

/// Stream produced by [`StillImageCamera`].
#[derive(Debug)]
pub struct StillImageStream {
    frame: Option<DynamicImage>,
}

impl StillImageStream {
    /// Wrap an in-memory frame.
    pub fn from_frame(frame: DynamicImage) -> Self {
        Self { frame: Some(frame) }
    }
}

impl VideoStream for StillImageStream {
    fn resolution(&self) -> (u32, u32) {
        self.frame.as_ref().map(|f| f.dimensions()).unwrap_or((0, 0))
    }

    fn current_frame(&mut self) -> Result<DynamicImage, CameraError> {
        self.frame.clone().ok_or(CameraError::Stopped)
    }

    fn stop(&mut self) {
        if self.frame.take().is_some() {
            debug!("Stopped still-image stream");
        }
    }

    fn is_live(&self) -> bool {
        self.frame.is_some()
    }
}
