use std::{fmt, path::Path};

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage, GenericImageView};
use tracing::info;

use crate::{
    error::Result,
    evidence::watermark::{draw_watermark, watermark_lines},
    protocol::Coordinate,
};

/// Widest output image, in pixels.
pub const MAX_OUTPUT_WIDTH: u32 = 800;
/// JPEG quality (0.6). Brings multi-megabyte frames down to roughly 200KB.
pub const JPEG_QUALITY: u8 = 60;
/// Assumed frame size when the stream reports zero dimensions.
const FALLBACK_SIZE: (u32, u32) = (1280, 720);

/// Local, ephemeral reference to a capture's image. Never valid as issue evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    fn for_file(file_name: &str) -> Self {
        Self(format!("local:{file_name}"))
    }

    /// The handle as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One photo-capture result. Superseded by a retake, never mutated.
#[derive(Debug, Clone)]
pub struct Capture {
    bytes: Vec<u8>,
    file_name: String,
    preview: PreviewHandle,
    timestamp: DateTime<Utc>,
    coordinate: Option<Coordinate>,
    width: u32,
    height: u32,
}

impl Capture {
    /// Encoded JPEG bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `evidence_<unix-millis>.jpg`
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Local preview handle. Not accepted as evidence.
    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// Capture time, UTC.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Capture time as ISO-8601 with milliseconds, e.g. `2026-10-16T03:51:05.000Z`.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Position burned into the watermark, if any.
    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.coordinate.as_ref()
    }

    /// Output dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Write the JPEG to disk, for previewing.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Output size for a source frame: width capped at [`MAX_OUTPUT_WIDTH`], aspect kept,
/// never upscaled.
pub fn output_size(source_width: u32, source_height: u32) -> (u32, u32) {
    let (w, h) = if source_width == 0 || source_height == 0 {
        FALLBACK_SIZE
    } else {
        (source_width, source_height)
    };

    if w <= MAX_OUTPUT_WIDTH {
        return (w, h);
    }

    // integer floor of h * (800 / w), avoiding float rounding at exact ratios
    let out_h = (h as u64 * MAX_OUTPUT_WIDTH as u64 / w as u64).max(1) as u32;
    (MAX_OUTPUT_WIDTH, out_h)
}

/// Downscale `frame`, burn in the watermark and encode it as JPEG.
pub fn capture_frame<Tz>(
    frame: &DynamicImage,
    coordinate: Option<Coordinate>,
    now: &DateTime<Tz>,
) -> Result<Capture>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let (source_w, source_h) = frame.dimensions();
    let (width, height) = output_size(source_w, source_h);

    let mut canvas = if (width, height) == (source_w, source_h) {
        frame.to_rgb8()
    } else {
        frame
            .resize_exact(width, height, FilterType::Lanczos3)
            .to_rgb8()
    };

    draw_watermark(&mut canvas, &watermark_lines(coordinate.as_ref(), now));

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY).encode_image(&canvas)?;

    let timestamp = now.with_timezone(&Utc);
    let file_name = format!("evidence_{}.jpg", timestamp.timestamp_millis());

    info!(
        file_name = %file_name,
        width,
        height,
        size_kb = %format!("{:.1}", bytes.len() as f64 / 1024.0),
        "Captured evidence photo"
    );

    Ok(Capture {
        preview: PreviewHandle::for_file(&file_name),
        bytes,
        file_name,
        timestamp,
        coordinate,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;
    use image::{ImageFormat, Rgb, RgbImage};

    use super::*;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-16T09:21:05+05:30").expect("valid date")
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }))
    }

    #[test]
    fn test_output_size() {
        assert_eq!(output_size(1280, 720), (800, 450));
        assert_eq!(output_size(1920, 1080), (800, 450));
        assert_eq!(output_size(4000, 3000), (800, 600));
        assert_eq!(output_size(640, 480), (640, 480));
        assert_eq!(output_size(800, 600), (800, 600));
        assert_eq!(output_size(0, 0), (800, 450));
        assert_eq!(output_size(8000, 1), (800, 1));
    }

    #[test]
    fn test_capture_downscales_wide_frames() {
        let capture = capture_frame(&gradient(1280, 720), None, &now()).unwrap();
        assert_eq!(capture.dimensions(), (800, 450));

        let decoded = image::load_from_memory_with_format(capture.bytes(), ImageFormat::Jpeg)
            .unwrap();
        assert_eq!(decoded.dimensions(), (800, 450));
    }

    #[test]
    fn test_capture_never_upscales() {
        let capture = capture_frame(&gradient(320, 240), None, &now()).unwrap();
        assert_eq!(capture.dimensions(), (320, 240));
    }

    #[test]
    fn test_capture_metadata() {
        let coordinate = Coordinate::new(11.0168, 76.9558).with_accuracy(8.0);
        let capture = capture_frame(&gradient(640, 480), Some(coordinate), &now()).unwrap();

        assert_eq!(capture.file_name(), "evidence_1792122665000.jpg");
        assert_eq!(capture.timestamp_iso(), "2026-10-16T03:51:05.000Z");
        assert_eq!(capture.coordinate(), Some(&coordinate));
        assert_eq!(capture.preview().as_str(), "local:evidence_1792122665000.jpg");
        assert!(capture.bytes().starts_with(&[0xFF, 0xD8]));
    }
}
