//! A client for reporting civic issues with live photo evidence.
//!
//! Evidence is captured from a live camera, stamped with time and GPS position, uploaded
//! to an image host, and filed with the issue service under the zone its location
//! falls in.

#![warn(missing_docs)]

/// Runtime configuration from the environment.
pub mod config;
/// Error and result types.
pub mod error;
/// Live evidence capture: location, camera, watermarking and encoding.
pub mod evidence;
/// GeoJSON export of issues.
pub mod export;
/// Display helpers for timestamps.
pub mod format;
/// Structs that describe the issue service's wire format.
pub mod protocol;
/// Composing, validating and updating issues.
pub mod report;
/// Clients for the issue service and the image host.
pub mod server;
/// Logged-in sessions, their storage and role capabilities.
pub mod session;
/// Mapping coordinates to administrative zones.
pub mod zone;

pub use error::{Error, Result};
