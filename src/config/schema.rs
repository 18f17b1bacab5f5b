//! Configuration schema types for `slp-render.toml`
//!
//! Defines the structure and validation rules for render and export defaults.

use crate::player::{is_valid_player, DEFAULT_PLAYER, MAX_PLAYER};
use serde::{Deserialize, Serialize};

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "slp-render.toml";

/// Rendering defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Palette file path, or `@name` for a built-in palette
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<String>,
    /// In-game player number (1-8)
    #[serde(default = "default_player")]
    pub player: u8,
    /// Draw outlines instead of unit bodies
    #[serde(default)]
    pub draw_outline: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { palette: None, player: default_player(), draw_outline: false }
    }
}

fn default_player() -> u8 {
    DEFAULT_PLAYER
}

/// Export defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Number of frames exported concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Stop at the first failing frame
    #[serde(default = "default_true")]
    pub fail_fast: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { jobs: default_jobs(), fail_fast: true }
    }
}

fn default_jobs() -> usize {
    1
}

fn default_true() -> bool {
    true
}

/// Complete slp-render.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlpRenderConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "render.player")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: '{}' {}", CONFIG_FILE_NAME, self.field, self.message)
    }
}

impl SlpRenderConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if !is_valid_player(self.render.player) {
            errors.push(ConfigValidationError {
                field: "render.player".to_string(),
                message: format!("must be between 1 and {}", MAX_PLAYER),
            });
        }

        if matches!(self.render.palette.as_deref(), Some("") | Some("@")) {
            errors.push(ConfigValidationError {
                field: "render.palette".to_string(),
                message: "must name a palette file or built-in palette".to_string(),
            });
        }

        if self.export.jobs == 0 {
            errors.push(ConfigValidationError {
                field: "export.jobs".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }
}
