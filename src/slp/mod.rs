//! SLP sprite container decoding.
//!
//! SLP is the sprite format of the Genie engine. A file starts with a 32-byte
//! header followed by one 32-byte record per frame:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | version, e.g. `2.0N` |
//! | 4 | 4 | frame count (i32) |
//! | 8 | 24 | comment, NUL padded |
//!
//! | Offset | Size | Frame record field |
//! |--------|------|--------------------|
//! | 0 | 4 | command table offset |
//! | 4 | 4 | outline table offset |
//! | 8 | 4 | palette offset |
//! | 12 | 4 | properties |
//! | 16 | 8 | width, height (i32) |
//! | 24 | 8 | hotspot x, y (i32) |
//!
//! Parsing an [`Slp`] only reads these tables. Pixel command streams are
//! decoded lazily, one frame at a time, by [`SpriteSource::render_frame`].

mod commands;

use crate::models::{FrameDescriptor, RenderOptions, RenderedFrame};
use crate::palette::Palette;
use crate::renderer::{composite, RenderError};
use crate::source::SpriteSource;
use std::path::Path;
use thiserror::Error;

pub use commands::decode_frame;

/// Size of the file header in bytes
pub const HEADER_SIZE: usize = 32;

/// Size of one frame table record in bytes
pub const FRAME_INFO_SIZE: usize = 32;

/// Length of the version field
const VERSION_LEN: usize = 4;

/// Length of the comment field
const COMMENT_LEN: usize = 24;

/// Malformed or unreadable SLP data
#[derive(Debug, Error)]
pub enum SlpError {
    /// The file could not be read
    #[error("failed to read container: {0}")]
    Io(#[from] std::io::Error),
    /// Header or frame table extends past the end of the data
    #[error("container truncated: need {needed} bytes, have {len}")]
    Truncated { needed: usize, len: usize },
    /// Header frame count is negative
    #[error("invalid frame count {0}")]
    InvalidFrameCount(i32),
    /// A frame record has a negative width or height
    #[error("frame {frame}: invalid size {width}x{height}")]
    InvalidSize { frame: usize, width: i32, height: i32 },
    /// A per-row table entry lies outside the data
    #[error("frame {frame} row {row}: {table} table entry at {offset:#x} is outside the file")]
    TableOutOfBounds { frame: usize, row: u32, table: &'static str, offset: usize },
    /// A row's command stream starts outside the data
    #[error("frame {frame} row {row}: command stream offset {offset:#x} is outside the file")]
    RowOutOfBounds { frame: usize, row: u32, offset: usize },
    /// A command stream ends before its end-of-row marker
    #[error("frame {frame} row {row}: command stream ends unexpectedly")]
    UnexpectedEnd { frame: usize, row: u32 },
    /// A row draws past the frame width
    #[error("frame {frame} row {row}: pixels overflow frame width {width}")]
    RowOverflow { frame: usize, row: u32, width: u32 },
    /// A frame's declared size is too large to decode
    #[error("frame {frame}: size {width}x{height} is too large to decode")]
    FrameTooLarge { frame: usize, width: u32, height: u32 },
    /// Unrecognized command byte
    #[error("frame {frame} row {row}: unknown command {command:#04x}")]
    UnknownCommand { frame: usize, row: u32, command: u8 },
}

/// Per-frame offsets into the command data.
///
/// The record's palette offset field is not used for rendering and is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTables {
    /// Offset of the per-row command stream offsets
    pub cmd_table_offset: u32,
    /// Offset of the per-row left/right padding table
    pub outline_table_offset: u32,
}

/// Header and frame table of an SLP container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlpHeader {
    pub version: String,
    pub comment: String,
    pub frames: Vec<FrameDescriptor>,
    pub tables: Vec<FrameTables>,
}

impl SlpHeader {
    /// Parse the header and frame table without touching pixel data.
    pub fn parse(data: &[u8]) -> Result<Self, SlpError> {
        if data.len() < HEADER_SIZE {
            return Err(SlpError::Truncated { needed: HEADER_SIZE, len: data.len() });
        }

        let version = fixed_string(&data[0..VERSION_LEN]);
        let num_frames = read_i32(data, VERSION_LEN).unwrap_or_default();
        let comment = fixed_string(&data[8..8 + COMMENT_LEN]);

        if num_frames < 0 {
            return Err(SlpError::InvalidFrameCount(num_frames));
        }
        let num_frames = num_frames as usize;

        let needed = num_frames
            .checked_mul(FRAME_INFO_SIZE)
            .and_then(|table| table.checked_add(HEADER_SIZE))
            .unwrap_or(usize::MAX);
        if data.len() < needed {
            return Err(SlpError::Truncated { needed, len: data.len() });
        }

        let mut frames = Vec::with_capacity(num_frames);
        let mut tables = Vec::with_capacity(num_frames);
        for frame in 0..num_frames {
            let base = HEADER_SIZE + frame * FRAME_INFO_SIZE;
            let record = &data[base..base + FRAME_INFO_SIZE];
            let field = |i: usize| read_u32(record, i * 4).unwrap_or_default();

            let width = field(4) as i32;
            let height = field(5) as i32;
            if width < 0 || height < 0 {
                return Err(SlpError::InvalidSize { frame, width, height });
            }

            tables.push(FrameTables {
                cmd_table_offset: field(0),
                outline_table_offset: field(1),
            });
            frames.push(FrameDescriptor {
                width: width as u32,
                height: height as u32,
                hotspot_x: field(6) as i32,
                hotspot_y: field(7) as i32,
                properties: field(3),
            });
        }

        if frames.is_empty() {
            tracing::warn!(version = %version, "container has no frames");
        }
        tracing::debug!(version = %version, frames = frames.len(), "parsed SLP header");

        Ok(Self { version, comment, frames, tables })
    }
}

/// An SLP container held in memory.
#[derive(Debug, Clone)]
pub struct Slp {
    header: SlpHeader,
    data: Vec<u8>,
}

impl Slp {
    /// Parse a container from its bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, SlpError> {
        let header = SlpHeader::parse(&data)?;
        Ok(Self { header, data })
    }

    /// Read and parse a container file.
    pub fn open(path: &Path) -> Result<Self, SlpError> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }
}

impl SpriteSource for Slp {
    fn version(&self) -> &str {
        &self.header.version
    }

    fn comment(&self) -> &str {
        &self.header.comment
    }

    fn frames(&self) -> &[FrameDescriptor] {
        &self.header.frames
    }

    fn render_frame(
        &self,
        index: usize,
        palette: &Palette,
        options: &RenderOptions,
    ) -> Result<RenderedFrame, RenderError> {
        let descriptor = self.frame(index)?;
        let tables = &self.header.tables[index];
        let indexed = decode_frame(&self.data, index, descriptor, tables)
            .map_err(|source| RenderError::Decode { index, source })?;
        composite(&indexed, palette, options)
    }
}

/// Decode a NUL-padded fixed-width string field.
fn fixed_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim_end().to_string()
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_i32(data: &[u8], offset: usize) -> Option<i32> {
    read_u32(data, offset).map(|v| v as i32)
}
