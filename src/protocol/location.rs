use serde::{Deserialize, Serialize};

/// A geographical position as reported by a device or picked on a map.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Copy)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Horizontal accuracy in whole meters, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<u32>,
}

impl Coordinate {
    /// A coordinate with no accuracy estimate (manual entry, map click).
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    /// Attach a raw accuracy reading, rounded to the nearest meter.
    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy = if meters.is_finite() && meters >= 0.0 {
            Some(meters.round() as u32)
        } else {
            None
        };
        self
    }

    /// `lat, lng` with five decimal places, as burned into evidence photos.
    pub fn to_display_string(&self) -> String {
        format!("{:.5}, {:.5}", self.latitude, self.longitude)
    }

    /// Context tag attached to uploaded images: `lat=<v>|lng=<v>`.
    pub fn upload_context(&self) -> String {
        format!("lat={}|lng={}", self.latitude, self.longitude)
    }
}
