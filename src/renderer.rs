//! Frame composition
//!
//! Turns a decoded [`IndexedFrame`] into an RGBA buffer by resolving every
//! pixel through the palette and the player's color slot. The alpha byte of
//! the result is transparency (0 = opaque, 255 = invisible), matching what
//! SLP renderers traditionally produce.

use crate::models::{RenderOptions, RenderedFrame};
use crate::palette::Palette;
use crate::slp::SlpError;
use thiserror::Error;

/// Palette distance between consecutive player color ramps
pub const PLAYER_COLOR_STRIDE: usize = 16;

/// Transparency of solid pixels
const TRANSPARENCY_OPAQUE: u8 = 0;

/// Transparency of empty pixels
const TRANSPARENCY_CLEAR: u8 = 255;

/// Transparency of shadow pixels
const SHADOW_TRANSPARENCY: u8 = 128;

/// Fully transparent pixel
const CLEAR: [u8; 4] = [0, 0, 0, TRANSPARENCY_CLEAR];

/// Shadow pixel: half-transparent black
const SHADOW: [u8; 4] = [0, 0, 0, SHADOW_TRANSPARENCY];

/// Error produced while rendering a frame
#[derive(Debug, Error)]
pub enum RenderError {
    /// A pixel resolved to an index past the end of the palette
    #[error("palette index {index} out of range for a {palette_len}-color palette")]
    PaletteIndexOutOfRange { index: usize, palette_len: usize },
    /// The requested frame does not exist
    #[error("frame index {index} out of range, container has {count} frames")]
    FrameIndexOutOfRange { index: usize, count: usize },
    /// The frame's command stream is malformed
    #[error("failed to decode frame {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: SlpError,
    },
}

/// One decoded source pixel, before palette lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexedPixel {
    /// Nothing drawn
    #[default]
    Transparent,
    /// Plain palette index
    Color(u8),
    /// Shade within the player's color ramp
    PlayerColor(u8),
    /// Unit shadow
    Shadow,
    /// Silhouette pixel, only drawn in outline mode
    Outline,
}

/// A width x height grid of [`IndexedPixel`]s, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    width: u32,
    height: u32,
    pixels: Vec<IndexedPixel>,
}

impl IndexedFrame {
    /// Create a fully transparent frame, or `None` if it cannot be allocated.
    pub fn try_new(width: u32, height: u32) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).ok()?;
        pixels.resize(len, IndexedPixel::Transparent);
        Some(Self { width, height, pixels })
    }

    /// Wrap existing pixels, or `None` if the count does not match the size.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<IndexedPixel>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[IndexedPixel] {
        &self.pixels
    }

    /// Mutable access to one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row_mut(&mut self, y: u32) -> &mut [IndexedPixel] {
        let width = self.width as usize;
        let start = y as usize * width;
        &mut self.pixels[start..start + width]
    }
}

/// Palette index of shade `value` in the ramp of player slot `player`.
pub fn player_color_index(value: u8, player: u8) -> usize {
    value as usize + PLAYER_COLOR_STRIDE * player as usize
}

/// Palette index of the outline color for player slot `player`.
pub fn outline_color_index(player: u8) -> usize {
    PLAYER_COLOR_STRIDE * player as usize
}

/// Composite an indexed frame into an RGBA buffer with transparency alpha.
///
/// In normal mode outline pixels are left transparent. With
/// `options.draw_outline` only outline pixels are drawn, all in the player's
/// outline color, and the unit body is left transparent.
///
/// # Errors
///
/// Returns [`RenderError::PaletteIndexOutOfRange`] for the first pixel whose
/// index is not in the palette. Indices are never clamped or wrapped.
pub fn composite(
    frame: &IndexedFrame,
    palette: &Palette,
    options: &RenderOptions,
) -> Result<RenderedFrame, RenderError> {
    let mut buffer = Vec::with_capacity(frame.pixels.len() * 4);

    for pixel in &frame.pixels {
        let rgba = match (*pixel, options.draw_outline) {
            (IndexedPixel::Transparent, _) => CLEAR,
            (IndexedPixel::Outline, false) => CLEAR,
            (IndexedPixel::Outline, true) => {
                opaque(palette, outline_color_index(options.player))?
            }
            (_, true) => CLEAR,
            (IndexedPixel::Color(index), false) => opaque(palette, index as usize)?,
            (IndexedPixel::PlayerColor(value), false) => {
                opaque(palette, player_color_index(value, options.player))?
            }
            (IndexedPixel::Shadow, false) => SHADOW,
        };
        buffer.extend_from_slice(&rgba);
    }

    Ok(RenderedFrame { width: frame.width, height: frame.height, buffer })
}

/// Look up a palette entry as an opaque pixel.
fn opaque(palette: &Palette, index: usize) -> Result<[u8; 4], RenderError> {
    let rgb = palette
        .get(index)
        .ok_or(RenderError::PaletteIndexOutOfRange { index, palette_len: palette.len() })?;
    Ok([rgb.0[0], rgb.0[1], rgb.0[2], TRANSPARENCY_OPAQUE])
}
