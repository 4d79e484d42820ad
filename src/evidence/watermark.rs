//! Burned-in evidence watermark: a translucent bottom bar with product label, capture
//! time and GPS position, a green accent stripe, and a "LIVE EVIDENCE" badge.

use std::fmt;

use chrono::{DateTime, TimeZone};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{Rgb, RgbImage};

use crate::protocol::Coordinate;

/// First line of every watermark.
pub const PRODUCT_LABEL: &str = "CivicPulse - Live Evidence";
/// Shown in place of coordinates when no fix was obtained.
pub const GPS_UNAVAILABLE: &str = "GPS unavailable";
/// Badge text in the top-right corner.
pub const LIVE_BADGE: &str = "LIVE EVIDENCE";

const BAR_HEIGHT: i64 = 90;
const BAR_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
const BAR_ALPHA: f32 = 0.72;
const STRIPE_WIDTH: i64 = 5;
const STRIPE_COLOR: Rgb<u8> = Rgb([0x22, 0xc5, 0x5e]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_LEFT: i64 = 14;
const LINE_GAP: i64 = 6;
const BADGE_COLOR: Rgb<u8> = Rgb([220, 38, 38]);
const BADGE_ALPHA: f32 = 0.90;
const GLYPH_SIZE: i64 = 8;

/// `16 Oct 2026, 09:21:05 am`
pub fn format_capture_time<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    now.format("%d %b %Y, %I:%M:%S %P").to_string()
}

/// The three text lines of the watermark. The GPS line is never blank.
pub fn watermark_lines<Tz>(coordinate: Option<&Coordinate>, now: &DateTime<Tz>) -> [String; 3]
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let location = coordinate
        .map(Coordinate::to_display_string)
        .unwrap_or_else(|| GPS_UNAVAILABLE.to_string());

    [
        PRODUCT_LABEL.to_string(),
        format!("Date: {}", format_capture_time(now)),
        format!("GPS:  {location}"),
    ]
}

/// Glyph magnification for an image of width `w`: font size `max(13, w/85)` px,
/// snapped to a whole multiple of the 8px glyph, then shrunk until a line of
/// `max_chars` glyphs fits beside the left margin. Never below 1.
fn text_scale(width: u32, max_chars: usize) -> i64 {
    let font_px = (13.0f64).max((width as f64 / 85.0).round());
    let wanted = (font_px / GLYPH_SIZE as f64).round() as i64;

    let line_px = max_chars.max(1) as i64 * GLYPH_SIZE;
    let fitting = (width as i64 - TEXT_LEFT) / line_px;

    wanted.min(fitting).max(1)
}

/// Draw the watermark onto `image` in place. Shapes are clipped to the image.
pub fn draw_watermark(image: &mut RgbImage, lines: &[String; 3]) {
    let (w, h) = (image.width() as i64, image.height() as i64);
    let bar_top = h - BAR_HEIGHT;

    fill_rect(image, 0, bar_top, w, BAR_HEIGHT, BAR_COLOR, BAR_ALPHA);
    fill_rect(image, 0, bar_top, STRIPE_WIDTH, BAR_HEIGHT, STRIPE_COLOR, 1.0);

    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let scale = text_scale(image.width(), longest);
    let glyph_px = GLYPH_SIZE * scale;
    for (i, line) in lines.iter().enumerate() {
        let baseline = bar_top + 24 + i as i64 * (glyph_px + LINE_GAP);
        draw_text(image, line, TEXT_LEFT, baseline - glyph_px, scale, TEXT_COLOR);
    }

    // badge: 130x30 box, 10px from the top-right corner, text right-aligned
    fill_rect(image, w - 140, 10, 130, 30, BADGE_COLOR, BADGE_ALPHA);
    let text_width = LIVE_BADGE.len() as i64 * GLYPH_SIZE;
    let text_left = w - 14 - text_width;
    let text_top = 10 + (30 - GLYPH_SIZE) / 2;
    fill_rect(image, text_left - 8, text_top + 2, 4, 4, TEXT_COLOR, 1.0);
    draw_text(image, LIVE_BADGE, text_left, text_top, 1, TEXT_COLOR);
}

fn fill_rect(
    image: &mut RgbImage,
    x: i64,
    y: i64,
    width: i64,
    height: i64,
    color: Rgb<u8>,
    alpha: f32,
) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + width).min(image.width() as i64);
    let y1 = (y + height).min(image.height() as i64);

    for py in y0..y1 {
        for px in x0..x1 {
            blend(image, px as u32, py as u32, color, alpha);
        }
    }
}

fn blend(image: &mut RgbImage, x: u32, y: u32, color: Rgb<u8>, alpha: f32) {
    let pixel = image.get_pixel_mut(x, y);
    for c in 0..3 {
        let under = pixel.0[c] as f32;
        let over = color.0[c] as f32;
        pixel.0[c] = (under * (1.0 - alpha) + over * alpha).round() as u8;
    }
}

fn draw_text(image: &mut RgbImage, text: &str, left: i64, top: i64, scale: i64, color: Rgb<u8>) {
    let advance = GLYPH_SIZE * scale;
    for (i, ch) in text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let glyph_left = left + i as i64 * advance;
        if glyph_left >= image.width() as i64 {
            break;
        }
        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                // bit 0 is the leftmost pixel
                if (bits >> col) & 1 == 1 {
                    fill_rect(
                        image,
                        glyph_left + col * scale,
                        top + row as i64 * scale,
                        scale,
                        scale,
                        color,
                        1.0,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    fn ist_time() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2026-10-16T09:21:05+05:30").expect("valid date")
    }

    #[test]
    fn test_lines_with_coordinates() {
        let coordinate = Coordinate::new(11.016844, 76.955832);
        let lines = watermark_lines(Some(&coordinate), &ist_time());

        assert_eq!(lines[0], PRODUCT_LABEL);
        assert_eq!(lines[1], "Date: 16 Oct 2026, 09:21:05 am");
        assert_eq!(lines[2], "GPS:  11.01684, 76.95583");
    }

    #[test]
    fn test_lines_without_coordinates() {
        let lines = watermark_lines(None, &ist_time());
        assert_eq!(lines[2], "GPS:  GPS unavailable");
    }

    #[test]
    fn test_afternoon_uses_pm() {
        let time = DateTime::parse_from_rfc3339("2026-10-16T21:05:00+05:30").unwrap();
        assert_eq!(format_capture_time(&time), "16 Oct 2026, 09:05:00 pm");
    }

    #[test]
    fn test_text_scale() {
        assert_eq!(text_scale(800, 30), 2);
        assert_eq!(text_scale(1600, 30), 2);
        assert_eq!(text_scale(320, 30), 1);
        assert_eq!(text_scale(1, 30), 1);
    }

    #[test]
    fn test_narrow_frame_keeps_full_coordinates() {
        let coordinate = Coordinate::new(11.016844, 76.955832);
        let lines = watermark_lines(Some(&coordinate), &ist_time());
        let mut image = RgbImage::from_pixel(320, 240, Rgb([200, 200, 200]));
        draw_watermark(&mut image, &lines);

        // every line fits at scale 1: 14 + 30 * 8 = 254
        let gps = &lines[2];
        let last = gps.chars().count() as i64 - 1;
        let left = TEXT_LEFT + last * GLYPH_SIZE;
        let top = (240 - BAR_HEIGHT) + 24 + 2 * (GLYPH_SIZE + LINE_GAP) - GLYPH_SIZE;
        assert!(left + GLYPH_SIZE <= 320);

        let lit = (0..GLYPH_SIZE)
            .flat_map(|dy| (0..GLYPH_SIZE).map(move |dx| (dx, dy)))
            .filter(|&(dx, dy)| {
                *image.get_pixel((left + dx) as u32, (top + dy) as u32) == TEXT_COLOR
            })
            .count();
        assert!(lit > 0, "last GPS digit was not drawn");
    }

    #[test]
    fn test_draw_darkens_bar_and_paints_stripe() {
        let mut image = RgbImage::from_pixel(400, 300, Rgb([200, 200, 200]));
        draw_watermark(&mut image, &watermark_lines(None, &ist_time()));

        // untouched area above the bar
        assert_eq!(*image.get_pixel(200, 100), Rgb([200, 200, 200]));
        // accent stripe
        assert_eq!(*image.get_pixel(2, 250), STRIPE_COLOR);
        // translucent bar, right edge clear of any text
        assert_eq!(*image.get_pixel(399, 295), Rgb([56, 56, 56]));
        // badge fill
        let badge = image.get_pixel(262, 12);
        assert!(badge.0[0] > badge.0[1]);
    }

    #[test]
    fn test_draw_on_tiny_image_does_not_panic() {
        let mut image = RgbImage::new(20, 10);
        draw_watermark(&mut image, &watermark_lines(None, &ist_time()));
    }
}
