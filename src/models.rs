//! Data types shared by the decoder, renderer and exporter.

use crate::player::{slot_for_player, DEFAULT_PLAYER};
use image::RgbaImage;
use serde::Serialize;

/// Size, anchor and flags of one frame, as stored in the container's frame table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameDescriptor {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Horizontal anchor offset
    pub hotspot_x: i32,
    /// Vertical anchor offset
    pub hotspot_y: i32,
    /// Raw properties bit field, not interpreted
    pub properties: u32,
}

impl FrameDescriptor {
    /// Returns the total number of pixels in this frame.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

/// Options for a single `render_frame` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// SLP player color slot (already remapped from the in-game number)
    pub player: u8,
    /// Draw only the outline silhouette instead of the unit body
    pub draw_outline: bool,
}

impl RenderOptions {
    /// Options for an in-game player number, remapped to its SLP slot.
    pub fn for_player(player: u8) -> Self {
        Self { player: slot_for_player(player), draw_outline: false }
    }

    /// Set outline-only rendering.
    pub fn with_outline(mut self, draw_outline: bool) -> Self {
        self.draw_outline = draw_outline;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::for_player(DEFAULT_PLAYER)
    }
}

/// A composited frame: `width * height` RGBA pixels, row-major.
///
/// The alpha byte holds whatever polarity the producer wrote; frames coming
/// out of [`crate::renderer::composite`] carry transparency (255 = invisible)
/// until passed through [`crate::alpha::invert_alpha`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    pub width: u32,
    pub height: u32,
    pub buffer: Vec<u8>,
}

impl RenderedFrame {
    /// Number of bytes a buffer of this size must hold
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Convert into an `image` buffer, or `None` if the byte count is wrong.
    pub fn into_image(self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.buffer)
    }
}
