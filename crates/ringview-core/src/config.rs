// src/config.rs
//! TOML configuration.
//!
//! ```toml
//! [main]
//! name = "ringview"
//!
//! [ui]
//! fps = 1.0
//! face_size = 160
//! faces_dir = "/etc/ringview/faces"
//!
//! [ui.faces]
//! happy = "(^_^)"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::faces::FaceSet;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub main: MainConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MainConfig {
    /// Device name shown on the panel.
    pub name: String,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            name: "ringview".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Periodic refresh rate; `<= 0` disables the refresh ticker.
    pub fps: f32,
    /// Square size face images are scaled to.
    pub face_size: u32,
    /// Directory holding `<face>.png` assets.
    pub faces_dir: Option<PathBuf>,
    /// Textual face overrides keyed by face name.
    pub faces: BTreeMap<String, String>,
    /// Encounters after which a peer counts as a good friend.
    pub good_friend_threshold: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            fps: 0.0,
            face_size: 160,
            faces_dir: None,
            faces: BTreeMap::new(),
            good_friend_threshold: 10,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.ui.fps.is_finite() {
            return Err(ConfigError::Invalid(format!("ui.fps must be finite, got {}", self.ui.fps)));
        }
        if self.ui.face_size == 0 {
            return Err(ConfigError::Invalid("ui.face_size must be non-zero".into()));
        }
        Ok(())
    }

    /// Face strings with the configured overrides applied.
    pub fn face_set(&self) -> FaceSet {
        FaceSet::with_overrides(self.ui.faces.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faces::Face;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.main.name, "ringview");
        assert_eq!(config.ui.fps, 0.0);
        assert_eq!(config.ui.face_size, 160);
        assert_eq!(config.ui.good_friend_threshold, 10);
    }

    #[test]
    fn test_parses_all_fields() {
        let config = Config::from_toml_str(
            r#"
            [main]
            name = "pico"

            [ui]
            fps = 2.5
            face_size = 120
            faces_dir = "/tmp/faces"

            [ui.faces]
            sad = "(T_T)"
            "#,
        )
        .unwrap();

        assert_eq!(config.main.name, "pico");
        assert_eq!(config.ui.fps, 2.5);
        assert_eq!(config.ui.face_size, 120);
        assert_eq!(config.ui.faces_dir, Some(PathBuf::from("/tmp/faces")));
        assert_eq!(config.face_set().text(Face::Sad), "(T_T)");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            Config::from_toml_str("[ui]\nface_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[ui]\nfps = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/ringview.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
