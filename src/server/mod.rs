mod api;
mod upload;

pub use api::CivicApi;
pub use upload::{ImageHost, UploadError, UploadedImage};
