//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! [display]
//! mode = "windowed_keep_aspect"
//! window_width = 1280
//! window_height = 720
//! resolution_width = 1920
//! resolution_height = 1080
//!
//! [pointer]
//! drag_threshold = 2.0
//! ```

use crate::error::ConfigError;
use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the render resolution relates to the host window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// The adapter is the window itself.
    #[default]
    Windowed,
    /// Fixed resolution letterboxed into the window.
    WindowedKeepAspect,
    /// Fixed resolution stretched over the whole display.
    Fullscreen,
}

impl DisplayMode {
    /// Windowed, then keep-aspect, then fullscreen, then back.
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Windowed => DisplayMode::WindowedKeepAspect,
            DisplayMode::WindowedKeepAspect => DisplayMode::Fullscreen,
            DisplayMode::Fullscreen => DisplayMode::Windowed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub mode: DisplayMode,
    pub window_width: f32,
    pub window_height: f32,
    pub resolution_width: f32,
    pub resolution_height: f32,
    pub display_width: f32,
    pub display_height: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Windowed,
            window_width: 1280.0,
            window_height: 720.0,
            resolution_width: 1280.0,
            resolution_height: 720.0,
            display_width: 1920.0,
            display_height: 1080.0,
        }
    }
}

impl DisplayConfig {
    pub fn window_size(&self) -> Size {
        Size::new(self.window_width, self.window_height)
    }

    pub fn resolution(&self) -> Size {
        Size::new(self.resolution_width, self.resolution_height)
    }

    pub fn display_size(&self) -> Size {
        Size::new(self.display_width, self.display_height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Displacement a press must exceed on either axis before it turns into
    /// a drag or resize.
    pub drag_threshold: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 2.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub display: DisplayConfig,
    pub pointer: PointerConfig,
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let display = &self.display;
        let sizes = [
            ("display.window_width", display.window_width),
            ("display.window_height", display.window_height),
            ("display.resolution_width", display.resolution_width),
            ("display.resolution_height", display.resolution_height),
            ("display.display_width", display.display_width),
            ("display.display_height", display.display_height),
        ];
        for (field, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive finite number, got {value}"),
                });
            }
        }
        let threshold = self.pointer.drag_threshold;
        if !(threshold.is_finite() && threshold >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "pointer.drag_threshold",
                reason: format!("must be a non-negative finite number, got {threshold}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DisplayMode, EngineConfig};
    use crate::error::ConfigError;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [display]
            mode = "fullscreen"
            resolution_width = 640
            resolution_height = 480
            "#,
        )
        .unwrap();
        assert_eq!(config.display.mode, DisplayMode::Fullscreen);
        assert_eq!(config.display.resolution_width, 640.0);
        assert_eq!(config.display.window_width, 1280.0);
        assert_eq!(config.pointer.drag_threshold, 2.0);
    }

    #[test]
    fn invalid_values_are_reported_by_field() {
        let err = EngineConfig::from_toml_str("[pointer]\ndrag_threshold = -1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "pointer.drag_threshold",
                ..
            }
        ));
        let err = EngineConfig::from_toml_str("[display]\nwindow_width = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "display.window_width", .. }));
        assert!(matches!(
            EngineConfig::from_toml_str("[display]\nmode = \"tiled\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn display_modes_cycle() {
        let mut mode = DisplayMode::Windowed;
        let mut seen = Vec::new();
        for _ in 0..3 {
            mode = mode.next();
            seen.push(mode);
        }
        assert_eq!(
            seen,
            vec![
                DisplayMode::WindowedKeepAspect,
                DisplayMode::Fullscreen,
                DisplayMode::Windowed
            ]
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load("/nonexistent/trellis.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
