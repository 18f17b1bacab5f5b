//! Configuration loading and discovery for `slp-render.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{SlpRenderConfig, CONFIG_FILE_NAME};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory under the XDG config home holding the user-wide config
const XDG_APP_DIR: &str = "slp-render";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse slp-render.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override palette file or built-in name
    pub palette: Option<String>,
    /// Override player number
    pub player: Option<u8>,
    /// Override outline mode
    pub draw_outline: Option<bool>,
    /// Number of parallel jobs
    pub jobs: Option<usize>,
    /// Override fail-fast behaviour
    pub fail_fast: Option<bool>,
}

/// Find slp-render.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for slp-render.toml
/// 2. Check XDG_CONFIG_HOME/slp-render/slp-render.toml (or ~/.config/slp-render/slp-render.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find slp-render.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join(XDG_APP_DIR).join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find slp-render.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a slp-render.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses
/// [`find_config`] to locate one. If no config file is found, returns the
/// default configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("mods/slp-render.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<SlpRenderConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(SlpRenderConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<SlpRenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: SlpRenderConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    // Palette files are relative to the config that names them
    if let (Some(palette), Some(root)) = (config.render.palette.as_mut(), config_root(path)) {
        if !palette.starts_with('@') {
            *palette = resolve_path(root, Path::new(palette.as_str())).to_string_lossy().into_owned();
        }
    }

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut SlpRenderConfig, overrides: &CliOverrides) {
    if let Some(ref palette) = overrides.palette {
        config.render.palette = Some(palette.clone());
    }

    if let Some(player) = overrides.player {
        config.render.player = player;
    }

    if let Some(draw_outline) = overrides.draw_outline {
        config.render.draw_outline = draw_outline;
    }

    if let Some(jobs) = overrides.jobs {
        config.export.jobs = jobs;
    }

    if let Some(fail_fast) = overrides.fail_fast {
        config.export.fail_fast = fail_fast;
    }
}

/// Directory containing a config file.
pub fn config_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the config directory.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
