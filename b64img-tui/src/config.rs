use std::fs;
use std::path::{Path, PathBuf};

use b64img::{EncodeOptions, OutputFormat};

/// Preferences remembered between runs
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub encode: EncodeOptions,
    /// File type preselected in the save dialog
    pub save_format: OutputFormat,
    /// Folder of the last successful save
    pub last_dir: Option<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            encode: EncodeOptions::default(),
            save_format: OutputFormat::Png,
            last_dir: None,
        }
    }
}

impl ViewerConfig {
    pub fn load_from(path: &Path) -> Option<Self> {
        fs::read_to_string(path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
    }

    pub fn save_to(&self, path: &Path) -> Option<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok()?;
        }

        serde_json::to_string_pretty(self)
            .ok()
            .and_then(|json| fs::write(path, json).ok())
    }

    /// `~/.config/b64img/config.json`
    pub fn config_path() -> Option<PathBuf> {
        #[allow(deprecated)]
        let home = std::env::home_dir()?;
        Some(home.join(".config").join("b64img").join("config.json"))
    }

    /// Folder the save dialog starts in
    pub fn save_dir(&self) -> PathBuf {
        self.last_dir
            .clone()
            .filter(|dir| dir.is_dir())
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = ViewerConfig::default();
        config.encode.jpeg_quality = 60;
        config.save_format = OutputFormat::Jpeg;
        config.last_dir = Some(dir.path().to_path_buf());

        config.save_to(&path).unwrap();
        assert_eq!(ViewerConfig::load_from(&path), Some(config));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "encode": { "jpeg_quality": 40 } }"#).unwrap();

        let config = ViewerConfig::load_from(&path).unwrap();
        assert_eq!(config.encode.jpeg_quality, 40);
        assert_eq!(config.encode.background, [255, 255, 255]);
        assert_eq!(config.save_format, OutputFormat::Png);
    }

    #[test]
    fn garbage_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(ViewerConfig::load_from(&path), None);
    }

    #[test]
    fn stale_save_dir_falls_back() {
        let config = ViewerConfig {
            last_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Default::default()
        };
        assert_ne!(config.save_dir(), PathBuf::from("/definitely/not/here"));
    }
}
