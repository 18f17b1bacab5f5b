//! SLP row command streams.
//!
//! Every row of a frame has a left/right padding entry in the outline table
//! and a command stream located through the command table. The low bits of a
//! command byte select the operation; the remaining bits, or the following
//! byte, hold the pixel count.

use super::{read_u16, read_u32, FrameTables, SlpError};
use crate::models::FrameDescriptor;
use crate::renderer::{IndexedFrame, IndexedPixel};

/// Outline table value marking a row with no pixels
const EMPTY_ROW: u16 = 0x8000;

/// End-of-row command
const END_OF_ROW: u8 = 0x0F;

/// Largest frame the decoder allocates, 4096 x 4096
pub const MAX_FRAME_PIXELS: usize = 1 << 24;

/// Size in bytes of one outline or command table entry
const TABLE_ENTRY_SIZE: usize = 4;

/// Decode every row of a frame into indexed pixels.
pub fn decode_frame(
    data: &[u8],
    frame: usize,
    descriptor: &FrameDescriptor,
    tables: &FrameTables,
) -> Result<IndexedFrame, SlpError> {
    let too_large = || SlpError::FrameTooLarge {
        frame,
        width: descriptor.width,
        height: descriptor.height,
    };
    let pixel_count = (descriptor.width as usize).checked_mul(descriptor.height as usize);
    if !matches!(pixel_count, Some(count) if count <= MAX_FRAME_PIXELS) {
        return Err(too_large());
    }

    if descriptor.height > 0 {
        check_table(data, frame, descriptor.height, "outline", tables.outline_table_offset)?;
        check_table(data, frame, descriptor.height, "command", tables.cmd_table_offset)?;
    }

    let mut out =
        IndexedFrame::try_new(descriptor.width, descriptor.height).ok_or_else(too_large)?;

    for row in 0..descriptor.height {
        let outline_entry = tables.outline_table_offset as usize + row as usize * 4;
        let (left, right) = read_u16(data, outline_entry)
            .zip(read_u16(data, outline_entry + 2))
            .ok_or(SlpError::TableOutOfBounds {
                frame,
                row,
                table: "outline",
                offset: outline_entry,
            })?;
        if left == EMPTY_ROW || right == EMPTY_ROW {
            continue;
        }

        let cmd_entry = tables.cmd_table_offset as usize + row as usize * 4;
        let offset = read_u32(data, cmd_entry).ok_or(SlpError::TableOutOfBounds {
            frame,
            row,
            table: "command",
            offset: cmd_entry,
        })? as usize;
        if offset >= data.len() {
            return Err(SlpError::RowOutOfBounds { frame, row, offset });
        }

        let mut decoder = RowDecoder {
            data,
            pos: offset,
            frame,
            row,
            x: left as usize,
            pixels: out.row_mut(row),
        };
        decoder.run()?;
    }

    tracing::trace!(frame, width = descriptor.width, height = descriptor.height, "decoded frame");
    Ok(out)
}

/// Ensure a per-row table with `height` entries lies inside the data.
fn check_table(
    data: &[u8],
    frame: usize,
    height: u32,
    table: &'static str,
    offset: u32,
) -> Result<(), SlpError> {
    let last_row = height - 1;
    let last_entry = (last_row as usize)
        .checked_mul(TABLE_ENTRY_SIZE)
        .and_then(|len| len.checked_add(offset as usize));
    match last_entry.and_then(|entry| entry.checked_add(TABLE_ENTRY_SIZE)) {
        Some(end) if end <= data.len() => Ok(()),
        _ => Err(SlpError::TableOutOfBounds {
            frame,
            row: last_row,
            table,
            offset: last_entry.unwrap_or(usize::MAX),
        }),
    }
}

/// Decodes one row's command stream into its slice of the frame.
struct RowDecoder<'a> {
    data: &'a [u8],
    pos: usize,
    frame: usize,
    row: u32,
    x: usize,
    pixels: &'a mut [IndexedPixel],
}

impl RowDecoder<'_> {
    fn run(&mut self) -> Result<(), SlpError> {
        loop {
            let command = self.next_byte()?;

            match command & 0x03 {
                0x00 => {
                    for _ in 0..command >> 2 {
                        let index = self.next_byte()?;
                        self.push(IndexedPixel::Color(index))?;
                    }
                    continue;
                }
                0x01 => {
                    let count = self.count_or_next(command, 2)?;
                    self.skip(count);
                    continue;
                }
                _ => {}
            }

            match command & 0x0F {
                0x02 => {
                    let count = self.long_count(command)?;
                    for _ in 0..count {
                        let index = self.next_byte()?;
                        self.push(IndexedPixel::Color(index))?;
                    }
                }
                0x03 => {
                    let count = self.long_count(command)?;
                    self.skip(count);
                }
                0x06 => {
                    let count = self.count_or_next(command, 4)?;
                    for _ in 0..count {
                        let value = self.next_byte()?;
                        self.push(IndexedPixel::PlayerColor(value))?;
                    }
                }
                0x07 => {
                    let count = self.count_or_next(command, 4)?;
                    let index = self.next_byte()?;
                    self.push_run(IndexedPixel::Color(index), count)?;
                }
                0x0A => {
                    let count = self.count_or_next(command, 4)?;
                    let value = self.next_byte()?;
                    self.push_run(IndexedPixel::PlayerColor(value), count)?;
                }
                0x0B => {
                    let count = self.count_or_next(command, 4)?;
                    self.push_run(IndexedPixel::Shadow, count)?;
                }
                0x0E => self.extended(command)?,
                END_OF_ROW => return Ok(()),
                _ => return Err(self.unknown(command)),
            }
        }
    }

    /// Extended commands: draw-order hints and outlines.
    fn extended(&mut self, command: u8) -> Result<(), SlpError> {
        match command {
            // x-flip hints for the game's draw order, no pixels
            0x0E | 0x1E | 0x2E | 0x3E => Ok(()),
            0x4E | 0x6E => self.push(IndexedPixel::Outline),
            0x5E | 0x7E => {
                let count = self.next_byte()? as usize;
                self.push_run(IndexedPixel::Outline, count)
            }
            _ => Err(self.unknown(command)),
        }
    }

    fn next_byte(&mut self) -> Result<u8, SlpError> {
        let byte = self
            .data
            .get(self.pos)
            .copied()
            .ok_or(SlpError::UnexpectedEnd { frame: self.frame, row: self.row })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Count stored in the high bits, or in the next byte when those are zero.
    fn count_or_next(&mut self, command: u8, shift: u32) -> Result<usize, SlpError> {
        match command >> shift {
            0 => Ok(self.next_byte()? as usize),
            count => Ok(count as usize),
        }
    }

    /// 12-bit count: high nibble of the command, then the next byte.
    fn long_count(&mut self, command: u8) -> Result<usize, SlpError> {
        let high = ((command & 0xF0) as usize) << 4;
        Ok(high + self.next_byte()? as usize)
    }

    fn skip(&mut self, count: usize) {
        self.x += count;
    }

    fn push(&mut self, pixel: IndexedPixel) -> Result<(), SlpError> {
        let width = self.pixels.len() as u32;
        let slot = self.pixels.get_mut(self.x).ok_or(SlpError::RowOverflow {
            frame: self.frame,
            row: self.row,
            width,
        })?;
        *slot = pixel;
        self.x += 1;
        Ok(())
    }

    fn push_run(&mut self, pixel: IndexedPixel, count: usize) -> Result<(), SlpError> {
        for _ in 0..count {
            self.push(pixel)?;
        }
        Ok(())
    }

    fn unknown(&self, command: u8) -> SlpError {
        SlpError::UnknownCommand { frame: self.frame, row: self.row, command }
    }
}
