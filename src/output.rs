//! PNG output and frame file naming

use crate::models::RenderedFrame;
use image::RgbaImage;
use std::io;
use std::path::{Path, PathBuf};

/// Extension of exported frame files
pub const FRAME_EXTENSION: &str = "png";

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
    /// Pixel buffer does not match the frame size
    BufferSize { expected: usize, actual: usize },
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
            OutputError::BufferSize { expected, actual } => {
                write!(f, "pixel buffer has {} bytes, expected {}", actual, expected)
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
            OutputError::BufferSize { .. } => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Convert a rendered frame into an image buffer.
pub fn frame_to_image(frame: RenderedFrame) -> Result<RgbaImage, OutputError> {
    let expected = frame.expected_len();
    let actual = frame.buffer.len();
    frame.into_image().ok_or(OutputError::BufferSize { expected, actual })
}

/// Save an RGBA image to a PNG file.
///
/// The parent directory must already exist.
///
/// # Arguments
///
/// * `image` - The image to save
/// * `path` - The output file path
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Path of the file a frame is exported to: `{dir}/{index}.png`.
///
/// # Examples
///
/// ```
/// use slp_render::output::frame_output_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(frame_output_path(Path::new("archer"), 3), PathBuf::from("archer/3.png"));
/// ```
pub fn frame_output_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}.{}", index, FRAME_EXTENSION))
}
