//! Alpha polarity conversion
//!
//! The SLP renderer writes transparency into the alpha byte (255 = invisible),
//! while PNG expects opacity (255 = solid).

/// Invert the alpha byte of every RGBA pixel in place.
///
/// Each 4-byte group has its fourth byte replaced by `255 - alpha`. A trailing
/// partial group is left untouched. Applying the transform twice restores the
/// original buffer.
///
/// # Examples
///
/// ```
/// use slp_render::alpha::invert_alpha;
///
/// let mut pixels = vec![10, 20, 30, 0, 0, 0, 0, 255];
/// invert_alpha(&mut pixels);
/// assert_eq!(pixels, vec![10, 20, 30, 255, 0, 0, 0, 0]);
/// ```
pub fn invert_alpha(buffer: &mut [u8]) {
    for pixel in buffer.chunks_exact_mut(4) {
        pixel[3] = 255 - pixel[3];
    }
}
