//! Container metadata reports.
//!
//! Inspection only reads the header and frame table, so it works on files
//! whose pixel data is damaged.

use crate::source::SpriteSource;
use serde::Serialize;
use std::fmt::Write;

/// Metadata of one frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub hotspot_x: i32,
    pub hotspot_y: i32,
    pub properties: u32,
}

/// Metadata of a whole container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub version: String,
    pub comment: String,
    pub frame_count: usize,
    pub frames: Vec<FrameReport>,
}

/// Collect the metadata of a container.
pub fn inspect<S: SpriteSource + ?Sized>(source: &S) -> Inspection {
    let frames = source
        .frames()
        .iter()
        .enumerate()
        .map(|(index, frame)| FrameReport {
            index,
            width: frame.width,
            height: frame.height,
            hotspot_x: frame.hotspot_x,
            hotspot_y: frame.hotspot_y,
            properties: frame.properties,
        })
        .collect::<Vec<_>>();

    Inspection {
        version: source.version().to_string(),
        comment: source.comment().to_string(),
        frame_count: frames.len(),
        frames,
    }
}

/// Human-readable report, one line per frame.
pub fn format_inspection(inspection: &Inspection) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Version: {}", inspection.version);
    let _ = writeln!(out, "Comment: {}", inspection.comment);
    let _ = writeln!(out, "Frames: {}", inspection.frame_count);
    for frame in &inspection.frames {
        let _ = writeln!(
            out,
            "Frame {}: {}x{}, hotspot ({}, {}), properties {}",
            frame.index,
            frame.width,
            frame.height,
            frame.hotspot_x,
            frame.hotspot_y,
            frame.properties
        );
    }
    out
}

impl Inspection {
    /// Pretty-printed JSON report.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
