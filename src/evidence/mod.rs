mod camera;
mod flow;
mod frame;
mod location;
mod watermark;

pub use camera::{
    CameraConstraints, CameraDevice, CameraError, StillImageCamera, StillImageStream,
    VideoStream,
};
pub use flow::{EvidenceCapture, Phase};
pub use frame::{capture_frame, output_size, Capture, PreviewHandle, JPEG_QUALITY, MAX_OUTPUT_WIDTH};
pub use location::{
    acquire_location, FixedLocation, LocationError, LocationProvider, LocationRequest,
    NoLocation, PositionFix,
};
pub use watermark::{
    draw_watermark, format_capture_time, watermark_lines, GPS_UNAVAILABLE, LIVE_BADGE,
    PRODUCT_LABEL,
};
