//! Built-in palette definitions.
//!
//! Provides palettes that ship with the binary and can be referenced by name
//! using the `@name` syntax on the command line.

use crate::palette::{Palette, PaletteError};
use image::Rgb;

/// List of all available built-in palette names.
const BUILTIN_NAMES: &[&str] = &["units", "grayscale"];

/// Palette used when none is configured.
pub const DEFAULT_BUILTIN: &str = "units";

/// 256-color unit palette with the eight player ramps at `16 * slot`.
const UNITS_PAL: &str = include_str!("../../assets/default-palette.pal");

/// Returns a list of all available built-in palette names.
pub fn list_builtins() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}

/// Returns a built-in palette by name.
pub fn get_builtin(name: &str) -> Result<Palette, PaletteError> {
    match name {
        "units" => Palette::parse_jasc(UNITS_PAL),
        "grayscale" => grayscale(),
        _ => Err(PaletteError::UnknownBuiltin(name.to_string())),
    }
}

/// The palette used when no `--palette` is given.
pub fn default_palette() -> Result<Palette, PaletteError> {
    get_builtin(DEFAULT_BUILTIN)
}

/// 256-step grayscale ramp, index `i` maps to `(i, i, i)`.
fn grayscale() -> Result<Palette, PaletteError> {
    Palette::new((0..=255u8).map(|v| Rgb([v, v, v])).collect())
}
