//! Sprite container capability interface.
//!
//! The exporter and inspector only talk to containers through
//! [`SpriteSource`], so the binary decoder can be swapped for another format
//! or replaced by an in-memory fake in tests.

use crate::models::{FrameDescriptor, RenderOptions, RenderedFrame};
use crate::palette::Palette;
use crate::renderer::RenderError;

/// A parsed sprite container that can report metadata and render frames.
pub trait SpriteSource: Sync {
    /// Format version string from the header
    fn version(&self) -> &str;

    /// Free-text comment from the header
    fn comment(&self) -> &str;

    /// Frame table, in index order
    fn frames(&self) -> &[FrameDescriptor];

    /// Number of frames in the container
    fn num_frames(&self) -> usize {
        self.frames().len()
    }

    /// Look up one frame's descriptor.
    fn frame(&self, index: usize) -> Result<&FrameDescriptor, RenderError> {
        let frames = self.frames();
        frames
            .get(index)
            .ok_or(RenderError::FrameIndexOutOfRange { index, count: frames.len() })
    }

    /// Decode and composite one frame.
    ///
    /// The returned buffer uses transparency alpha (255 = invisible).
    fn render_frame(
        &self,
        index: usize,
        palette: &Palette,
        options: &RenderOptions,
    ) -> Result<RenderedFrame, RenderError>;
}
