use std::{env, path::PathBuf};

use tracing::{debug, info, warn};

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the issue API, e.g. `http://localhost:8080`.
    pub api_base_url: String,
    /// Image host settings.
    pub upload: UploadConfig,
    /// Directory that holds the stored session keys.
    pub session_dir: PathBuf,
}

/// Settings for the unsigned image-host upload.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadConfig {
    /// Upload API root, without the cloud name.
    pub endpoint: String,
    /// Account (cloud) name on the image host.
    pub cloud_name: String,
    /// Unsigned upload preset.
    pub upload_preset: String,
    /// Destination folder for evidence photos.
    pub folder: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.cloudinary.com/v1_1".to_string(),
            cloud_name: "drjlc6sb1".to_string(),
            upload_preset: "civic_issues".to_string(),
            folder: "civicpulse/evidence".to_string(),
        }
    }
}

impl UploadConfig {
    /// Full URL of the image upload route.
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.endpoint.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

impl Config {
    /// Load configuration from `CIVIC_*` environment variables, falling back to defaults.
    pub fn load() -> Self {
        let upload_defaults = UploadConfig::default();

        let config = Self {
            api_base_url: var_or("CIVIC_API_BASE_URL", "http://localhost:8080"),
            upload: UploadConfig {
                endpoint: var_or("CIVIC_UPLOAD_ENDPOINT", &upload_defaults.endpoint),
                cloud_name: var_or("CIVIC_UPLOAD_CLOUD_NAME", &upload_defaults.cloud_name),
                upload_preset: var_or("CIVIC_UPLOAD_PRESET", &upload_defaults.upload_preset),
                folder: var_or("CIVIC_UPLOAD_FOLDER", &upload_defaults.folder),
            },
            session_dir: env::var("CIVIC_SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_session_dir()),
        };

        debug!(?config, "Loaded configuration");
        config
    }
}

fn var_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        Ok(_) => {
            warn!("{key} is empty, using default: {default}");
            default.to_string()
        }
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }
    }
}

/// `~/.config/civic-pulse` on Linux, falling back to the working directory.
pub fn default_session_dir() -> PathBuf {
    let mut path = dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push("civic-pulse");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_url_joins_cloud_name() {
        let config = UploadConfig {
            endpoint: "http://127.0.0.1:9000/v1_1/".to_string(),
            cloud_name: "demo".to_string(),
            ..UploadConfig::default()
        };

        assert_eq!(
            config.upload_url(),
            "http://127.0.0.1:9000/v1_1/demo/image/upload"
        );
    }

    #[test]
    fn test_default_session_dir_is_namespaced() {
        assert!(default_session_dir().ends_with("civic-pulse"));
    }
}
