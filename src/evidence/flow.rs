use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::{
    error::{Error, Result},
    evidence::{
        camera::{CameraConstraints, CameraDevice, VideoStream},
        frame::{capture_frame, Capture},
        location::{acquire_location, LocationProvider},
    },
    protocol::Coordinate,
    zone::{self, Zone},
};

/// Where the capture flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing started, or cancelled.
    Idle,
    /// Waiting on the location provider.
    Locating,
    /// Camera stream is live and a capture may be taken.
    Camera,
    /// A photo was taken; the stream has been released.
    Captured,
    /// The camera could not be opened. See [`EvidenceCapture::error_message`].
    Error,
}

/// Live-evidence capture: locate, open the rear camera, take one watermarked photo.
///
/// The camera is held only while in [`Phase::Camera`]. It is released after a capture,
/// on cancel, on restart and on drop.
pub struct EvidenceCapture<L: LocationProvider, C: CameraDevice> {
    location_provider: L,
    camera: C,
    phase: Phase,
    location: Option<Coordinate>,
    stream: Option<C::Stream>,
    captured: Option<Capture>,
    error: Option<String>,
}

impl<L: LocationProvider, C: CameraDevice> EvidenceCapture<L, C> {
    /// A flow in the `Idle` phase over these devices.
    pub fn new(location_provider: L, camera: C) -> Self {
        Self {
            location_provider,
            camera,
            phase: Phase::Idle,
            location: None,
            stream: None,
            captured: None,
            error: None,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Position acquired by the last `start`, if any.
    pub fn location(&self) -> Option<&Coordinate> {
        self.location.as_ref()
    }

    /// Zone for the acquired position; unassigned without one.
    pub fn zone(&self) -> Zone {
        zone::resolve_optional(self.location.as_ref())
    }

    /// The photo taken by the last `capture`, if still held.
    pub fn capture_result(&self) -> Option<&Capture> {
        self.captured.as_ref()
    }

    /// Take ownership of the capture, e.g. to hand it to a report draft.
    pub fn take_capture(&mut self) -> Option<Capture> {
        self.captured.take()
    }

    /// Message for the `Error` phase.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Begin (or restart) the flow. Location failures never block the camera.
    pub async fn start(&mut self) {
        self.release_stream();
        self.captured = None;
        self.error = None;

        self.phase = Phase::Locating;
        self.location = acquire_location(&self.location_provider).await;

        match self.camera.open(&CameraConstraints::EVIDENCE).await {
            Ok(stream) => {
                let (width, height) = stream.resolution();
                info!(width, height, located = self.location.is_some(), "Camera ready");
                self.stream = Some(stream);
                self.phase = Phase::Camera;
            }
            Err(e) => {
                warn!(error = %e, "Could not open camera");
                self.error = Some(e.user_message().to_string());
                self.phase = Phase::Error;
            }
        }
    }

    /// Capture the current frame, stamped with the local time.
    pub async fn capture(&mut self) -> Result<&Capture> {
        self.capture_at(Local::now()).await
    }

    /// Capture the current frame with an explicit timestamp.
    pub async fn capture_at(&mut self, now: DateTime<Local>) -> Result<&Capture> {
        let stream = match (self.phase, self.stream.as_mut()) {
            (Phase::Camera, Some(stream)) if stream.is_live() => stream,
            _ => return Err(Error::CameraNotReady),
        };

        let frame = stream.current_frame()?;
        let coordinate = self.location;
        let capture = tokio::task::spawn_blocking(move || capture_frame(&frame, coordinate, &now))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        self.release_stream();
        self.phase = Phase::Captured;
        Ok(self.captured.insert(capture))
    }

    /// Discard the capture and start over, re-acquiring the location.
    pub async fn retake(&mut self) {
        self.captured = None;
        self.start().await;
    }

    /// Restart after an error.
    pub async fn retry(&mut self) {
        self.start().await;
    }

    /// Release the camera and go back to idle.
    pub fn cancel(&mut self) {
        self.release_stream();
        self.phase = Phase::Idle;
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
    }
}

impl<L: LocationProvider, C: CameraDevice> Drop for EvidenceCapture<L, C> {
    fn drop(&mut self) {
        self.release_stream();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use chrono::TimeZone;
    use image::DynamicImage;

    use super::*;
    use crate::evidence::{
        camera::CameraError,
        location::{FixedLocation, NoLocation},
    };

    #[derive(Default, Clone)]
    struct Counters {
        opened: Arc<AtomicUsize>,
        stopped: Arc<AtomicUsize>,
    }

    struct TestCamera {
        counters: Counters,
        deny: bool,
    }

    struct TestStream {
        counters: Counters,
        live: bool,
    }

    impl VideoStream for TestStream {
        fn resolution(&self) -> (u32, u32) {
            (1280, 720)
        }

        fn current_frame(&mut self) -> std::result::Result<DynamicImage, CameraError> {
            if self.live {
                Ok(DynamicImage::new_rgb8(1280, 720))
            } else {
                Err(CameraError::Stopped)
            }
        }

        fn stop(&mut self) {
            if self.live {
                self.live = false;
                self.counters.stopped.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn is_live(&self) -> bool {
            self.live
        }
    }

    impl CameraDevice for TestCamera {
        type Stream = TestStream;

        async fn open(
            &self,
            _constraints: &CameraConstraints,
        ) -> std::result::Result<TestStream, CameraError> {
            if self.deny {
                return Err(CameraError::PermissionDenied);
            }
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(TestStream {
                counters: self.counters.clone(),
                live: true,
            })
        }
    }

    fn camera(counters: &Counters) -> TestCamera {
        TestCamera {
            counters: counters.clone(),
            deny: false,
        }
    }

    fn at(seconds: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 16, 9, 21, seconds).unwrap()
    }

    #[tokio::test]
    async fn test_capture_before_ready_is_rejected() {
        let counters = Counters::default();
        let mut flow = EvidenceCapture::new(NoLocation, camera(&counters));

        assert_eq!(flow.phase(), Phase::Idle);
        assert!(matches!(flow.capture().await, Err(Error::CameraNotReady)));
        assert!(flow.capture_result().is_none());
    }

    #[tokio::test]
    async fn test_capture_releases_camera() {
        let counters = Counters::default();
        let location = FixedLocation::new(11.0168, 76.9558, Some(12.0));
        let mut flow = EvidenceCapture::new(location, camera(&counters));

        flow.start().await;
        assert_eq!(flow.phase(), Phase::Camera);
        assert_eq!(flow.zone(), Zone::Central);

        let capture = flow.capture_at(at(5)).await.unwrap();
        assert_eq!(capture.dimensions(), (800, 450));
        assert_eq!(capture.coordinate().map(|c| c.accuracy), Some(Some(12)));

        assert_eq!(flow.phase(), Phase::Captured);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);

        // no second capture from a released stream
        assert!(matches!(flow.capture().await, Err(Error::CameraNotReady)));
    }

    #[tokio::test]
    async fn test_retake_yields_new_capture() {
        let counters = Counters::default();
        let mut flow = EvidenceCapture::new(NoLocation, camera(&counters));

        flow.start().await;
        let first = flow.capture_at(at(5)).await.unwrap().clone();

        flow.retake().await;
        assert_eq!(flow.phase(), Phase::Camera);
        assert!(flow.capture_result().is_none());

        let second = flow.capture_at(at(9)).await.unwrap();
        assert_ne!(first.timestamp(), second.timestamp());
        assert_ne!(first.file_name(), second.file_name());
        assert_eq!(counters.opened.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_camera_denied_enters_error() {
        let counters = Counters::default();
        let mut flow = EvidenceCapture::new(
            NoLocation,
            TestCamera {
                counters: counters.clone(),
                deny: true,
            },
        );

        flow.start().await;
        assert_eq!(flow.phase(), Phase::Error);
        assert!(flow.error_message().unwrap().starts_with("Camera access denied"));
        assert!(matches!(flow.capture().await, Err(Error::CameraNotReady)));
    }

    #[tokio::test]
    async fn test_cancel_and_drop_release_camera() {
        let counters = Counters::default();
        {
            let mut flow = EvidenceCapture::new(NoLocation, camera(&counters));
            flow.start().await;
            flow.cancel();
            assert_eq!(flow.phase(), Phase::Idle);
            assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);

            flow.start().await;
        }
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_location_failure_does_not_block_camera() {
        let counters = Counters::default();
        let mut flow = EvidenceCapture::new(NoLocation, camera(&counters));

        flow.start().await;
        assert_eq!(flow.phase(), Phase::Camera);
        assert!(flow.location().is_none());
        assert_eq!(flow.zone(), Zone::Unassigned);

        let capture = flow.capture_at(at(1)).await.unwrap();
        assert!(capture.coordinate().is_none());
    }
}
