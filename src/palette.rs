//! Indexed color palettes and the JASC-PAL format
//!
//! A [`Palette`] holds up to 256 RGB entries addressed by the byte values found
//! in SLP command streams. Palettes are read from JASC-PAL text files:
//!
//! ```text
//! JASC-PAL
//! 0100
//! 3
//! 0 0 0
//! 255 0 0
//! 0 255 0
//! ```
//!
//! # Example
//!
//! ```
//! use slp_render::palette::Palette;
//!
//! let palette = Palette::parse_jasc("JASC-PAL\n0100\n2\n0 0 0\n255 128 0\n").unwrap();
//! assert_eq!(palette.len(), 2);
//! assert_eq!(palette.get(1), Some(image::Rgb([255, 128, 0])));
//! ```

use image::Rgb;
use std::path::Path;
use thiserror::Error;

/// Header line every JASC-PAL file starts with
const JASC_HEADER: &str = "JASC-PAL";

/// Error while loading or parsing a palette
#[derive(Debug, Error)]
pub enum PaletteError {
    /// The palette file could not be read
    #[error("failed to read palette: {0}")]
    Io(#[from] std::io::Error),
    /// First line is not `JASC-PAL`
    #[error("missing JASC-PAL header")]
    MissingHeader,
    /// File ends before the version line
    #[error("missing palette version line")]
    MissingVersion,
    /// Count line is absent or not a number
    #[error("line {line}: invalid color count '{value}'")]
    InvalidCount { line: usize, value: String },
    /// Count or entry list outside 1-256
    #[error("palette has {0} colors, expected 1-256")]
    CountOutOfRange(usize),
    /// A color line is not three integers in 0-255
    #[error("line {line}: invalid color entry '{value}'")]
    InvalidEntry { line: usize, value: String },
    /// File ends before `expected` entries were read
    #[error("expected {expected} colors, found {found}")]
    MissingEntries { expected: usize, found: usize },
    /// Unknown `@name` palette
    #[error("unknown built-in palette '{0}'")]
    UnknownBuiltin(String),
}

/// An indexed RGB color table with at most 256 entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    /// Largest number of entries an 8-bit index can address
    pub const MAX_COLORS: usize = 256;

    /// Create a palette from a list of colors.
    ///
    /// Fails if the list is empty or longer than [`Palette::MAX_COLORS`].
    pub fn new(colors: Vec<Rgb<u8>>) -> Result<Self, PaletteError> {
        if colors.is_empty() || colors.len() > Self::MAX_COLORS {
            return Err(PaletteError::CountOutOfRange(colors.len()));
        }
        Ok(Self { colors })
    }

    /// Read and parse a JASC-PAL file.
    pub fn load(path: &Path) -> Result<Self, PaletteError> {
        let text = std::fs::read_to_string(path)?;
        let palette = Self::parse_jasc(&text)?;
        tracing::debug!(path = %path.display(), colors = palette.len(), "loaded palette");
        Ok(palette)
    }

    /// Parse JASC-PAL text.
    ///
    /// The header must read `JASC-PAL`, followed by a version line and the
    /// number of entries. Exactly that many `R G B` lines must follow; anything
    /// after them is ignored. CRLF line endings are accepted.
    pub fn parse_jasc(text: &str) -> Result<Self, PaletteError> {
        let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line.trim()));

        match lines.next() {
            Some((_, JASC_HEADER)) => {}
            _ => return Err(PaletteError::MissingHeader),
        }

        if lines.next().is_none() {
            return Err(PaletteError::MissingVersion);
        }

        let (count_line, count_text) = lines
            .next()
            .ok_or(PaletteError::InvalidCount { line: 3, value: String::new() })?;
        let count: usize = count_text.parse().map_err(|_| PaletteError::InvalidCount {
            line: count_line,
            value: count_text.to_string(),
        })?;
        if count == 0 || count > Self::MAX_COLORS {
            return Err(PaletteError::CountOutOfRange(count));
        }

        let mut colors = Vec::with_capacity(count);
        for (line, text) in lines.take(count) {
            colors.push(parse_entry(line, text)?);
        }

        if colors.len() < count {
            return Err(PaletteError::MissingEntries { expected: count, found: colors.len() });
        }

        Self::new(colors)
    }

    /// Look up an entry, or `None` if the index is past the end of the table.
    pub fn get(&self, index: usize) -> Option<Rgb<u8>> {
        self.colors.get(index).copied()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false for a constructed palette; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// All entries in index order
    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }
}

/// Parse one `R G B` line.
fn parse_entry(line: usize, text: &str) -> Result<Rgb<u8>, PaletteError> {
    let invalid = || PaletteError::InvalidEntry { line, value: text.to_string() };

    let mut channels = text.split_whitespace().map(|c| c.parse::<u8>());
    let mut rgb = [0u8; 3];
    for channel in rgb.iter_mut() {
        *channel = channels.next().ok_or_else(invalid)?.map_err(|_| invalid())?;
    }
    if channels.next().is_some() {
        return Err(invalid());
    }
    Ok(Rgb(rgb))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jasc(entries: &[&str]) -> String {
        let mut text = format!("JASC-PAL\n0100\n{}\n", entries.len());
        for entry in entries {
            text.push_str(entry);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_parse_basic() {
        let palette = Palette::parse_jasc(&jasc(&["0 0 0", "255 255 255", "12 34 56"])).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(palette.get(0), Some(Rgb([0, 0, 0])));
        assert_eq!(palette.get(2), Some(Rgb([12, 34, 56])));
        assert_eq!(palette.get(3), None);
    }

    #[test]
    fn test_parse_crlf_and_trailing_blank_lines() {
        let text = "JASC-PAL\r\n0100\r\n2\r\n1 2 3\r\n4 5 6\r\n\r\n\r\n";
        let palette = Palette::parse_jasc(text).unwrap();
        assert_eq!(palette.colors(), &[Rgb([1, 2, 3]), Rgb([4, 5, 6])]);
    }

    #[test]
    fn test_parse_full_table() {
        let entries: Vec<String> = (0..256).map(|i| format!("{} {} {}", i, i, i)).collect();
        let refs: Vec<&str> = entries.iter().map(String::as_str).collect();
        let palette = Palette::parse_jasc(&jasc(&refs)).unwrap();
        assert_eq!(palette.len(), Palette::MAX_COLORS);
        assert_eq!(palette.get(255), Some(Rgb([255, 255, 255])));
    }

    #[test]
    fn test_missing_header() {
        let err = Palette::parse_jasc("RIFF\n0100\n1\n0 0 0\n").unwrap_err();
        assert!(matches!(err, PaletteError::MissingHeader));
        assert!(matches!(Palette::parse_jasc("").unwrap_err(), PaletteError::MissingHeader));
    }

    #[test]
    fn test_missing_version() {
        let err = Palette::parse_jasc("JASC-PAL\n").unwrap_err();
        assert!(matches!(err, PaletteError::MissingVersion));
    }

    #[test]
    fn test_invalid_count() {
        let err = Palette::parse_jasc("JASC-PAL\n0100\nlots\n").unwrap_err();
        assert!(matches!(err, PaletteError::InvalidCount { line: 3, .. }));
    }

    #[test]
    fn test_count_out_of_range() {
        let err = Palette::parse_jasc("JASC-PAL\n0100\n257\n").unwrap_err();
        assert!(matches!(err, PaletteError::CountOutOfRange(257)));
        let err = Palette::parse_jasc("JASC-PAL\n0100\n0\n").unwrap_err();
        assert!(matches!(err, PaletteError::CountOutOfRange(0)));
    }

    #[test]
    fn test_invalid_entries_report_line() {
        let err = Palette::parse_jasc(&jasc(&["0 0 0", "256 0 0"])).unwrap_err();
        assert!(matches!(err, PaletteError::InvalidEntry { line: 5, .. }));

        let err = Palette::parse_jasc(&jasc(&["0 0"])).unwrap_err();
        assert!(matches!(err, PaletteError::InvalidEntry { line: 4, .. }));

        let err = Palette::parse_jasc(&jasc(&["0 0 0 0"])).unwrap_err();
        assert!(matches!(err, PaletteError::InvalidEntry { line: 4, .. }));
    }

    #[test]
    fn test_missing_entries() {
        let err = Palette::parse_jasc("JASC-PAL\n0100\n3\n0 0 0\n").unwrap_err();
        assert!(matches!(err, PaletteError::MissingEntries { expected: 3, found: 1 }));
    }

    #[test]
    fn test_new_rejects_oversized() {
        let err = Palette::new(vec![Rgb([0, 0, 0]); 300]).unwrap_err();
        assert!(matches!(err, PaletteError::CountOutOfRange(300)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Palette::load(Path::new("/nonexistent/palette.pal")).unwrap_err();
        assert!(matches!(err, PaletteError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.pal");
        std::fs::write(&path, jasc(&["9 8 7"])).unwrap();
        let palette = Palette::load(&path).unwrap();
        assert_eq!(palette.get(0), Some(Rgb([9, 8, 7])));
    }
}
