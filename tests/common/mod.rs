//! Helpers for building SLP containers in memory

#![allow(dead_code)]

/// One source pixel of a test frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Px {
    Clear,
    Color(u8),
    Player(u8),
    Shadow,
    Outline,
}

/// A frame to encode
#[derive(Debug, Clone)]
pub struct TestFrame {
    pub width: u32,
    pub height: u32,
    pub hotspot: (i32, i32),
    pub properties: u32,
    pub rows: Vec<Vec<Px>>,
    /// Point every row's command stream outside the file
    pub corrupt: bool,
}

impl TestFrame {
    /// Frame built from explicit rows; width is the length of the first row.
    pub fn from_rows(rows: Vec<Vec<Px>>) -> Self {
        let width = rows.first().map_or(0, |r| r.len() as u32);
        Self { width, height: rows.len() as u32, hotspot: (0, 0), properties: 0, rows, corrupt: false }
    }

    /// Frame filled with a single pixel kind.
    pub fn filled(width: u32, height: u32, px: Px) -> Self {
        Self::from_rows(vec![vec![px; width as usize]; height as usize])
    }

    /// Frame whose metadata is valid but whose pixel data cannot be decoded.
    pub fn corrupt(width: u32, height: u32) -> Self {
        Self { corrupt: true, ..Self::filled(width, height, Px::Color(1)) }
    }

    pub fn with_hotspot(mut self, x: i32, y: i32) -> Self {
        self.hotspot = (x, y);
        self
    }

    pub fn with_properties(mut self, properties: u32) -> Self {
        self.properties = properties;
        self
    }
}

/// Encode a complete SLP 2.0N container.
pub fn build_slp(version: &str, comment: &str, frames: &[TestFrame]) -> Vec<u8> {
    let mut header = Vec::new();
    let mut version_field = [0u8; 4];
    version_field[..version.len()].copy_from_slice(version.as_bytes());
    header.extend_from_slice(&version_field);
    header.extend_from_slice(&(frames.len() as i32).to_le_bytes());
    let mut comment_field = [0u8; 24];
    comment_field[..comment.len()].copy_from_slice(comment.as_bytes());
    header.extend_from_slice(&comment_field);

    let mut body = Vec::new();
    let body_start = 32 + 32 * frames.len();
    let mut records = Vec::new();

    for frame in frames {
        let height = frame.rows.len();
        let outline_offset = body_start + body.len();
        let cmd_offset = outline_offset + 4 * height;
        let mut streams_offset = cmd_offset + 4 * height;

        let mut outline_table = Vec::new();
        let mut cmd_table = Vec::new();
        let mut streams = Vec::new();

        for row in &frame.rows {
            let left = row.iter().take_while(|p| **p == Px::Clear).count();
            if left == row.len() {
                outline_table.extend_from_slice(&0x8000u16.to_le_bytes());
                outline_table.extend_from_slice(&0x8000u16.to_le_bytes());
                cmd_table.extend_from_slice(&0u32.to_le_bytes());
                continue;
            }
            let right = row.iter().rev().take_while(|p| **p == Px::Clear).count();
            outline_table.extend_from_slice(&(left as u16).to_le_bytes());
            outline_table.extend_from_slice(&(right as u16).to_le_bytes());

            let stream = encode_row(&row[left..row.len() - right]);
            let offset = if frame.corrupt { 0xFFFF_FFF0 } else { streams_offset as u32 };
            cmd_table.extend_from_slice(&offset.to_le_bytes());
            streams_offset += stream.len();
            streams.extend_from_slice(&stream);
        }

        body.extend_from_slice(&outline_table);
        body.extend_from_slice(&cmd_table);
        body.extend_from_slice(&streams);

        for value in [
            cmd_offset as u32,
            outline_offset as u32,
            0,
            frame.properties,
            frame.width,
            frame.height,
            frame.hotspot.0 as u32,
            frame.hotspot.1 as u32,
        ] {
            records.extend_from_slice(&value.to_le_bytes());
        }
    }

    let mut data = header;
    data.extend_from_slice(&records);
    data.extend_from_slice(&body);
    data
}

/// Encode the visible part of a row as commands, ending with end-of-row.
fn encode_row(pixels: &[Px]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < pixels.len() {
        let kind = std::mem::discriminant(&pixels[i]);
        let run = pixels[i..].iter().take_while(|p| std::mem::discriminant(*p) == kind).count();
        let group = &pixels[i..i + run];

        match pixels[i] {
            Px::Clear => {
                for chunk in group.chunks(255) {
                    out.extend_from_slice(&[0x01, chunk.len() as u8]);
                }
            }
            Px::Color(_) => {
                for chunk in group.chunks(63) {
                    out.push((chunk.len() as u8) << 2);
                    out.extend(chunk.iter().map(value_of));
                }
            }
            Px::Player(_) => {
                for chunk in group.chunks(15) {
                    out.push(((chunk.len() as u8) << 4) | 0x06);
                    out.extend(chunk.iter().map(value_of));
                }
            }
            Px::Shadow => {
                for chunk in group.chunks(15) {
                    out.push(((chunk.len() as u8) << 4) | 0x0B);
                }
            }
            Px::Outline => {
                for chunk in group.chunks(255) {
                    out.extend_from_slice(&[0x5E, chunk.len() as u8]);
                }
            }
        }
        i += run;
    }

    out.push(0x0F);
    out
}

fn value_of(px: &Px) -> u8 {
    match px {
        Px::Color(v) | Px::Player(v) => *v,
        _ => 0,
    }
}
