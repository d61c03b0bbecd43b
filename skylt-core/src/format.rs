//! Pixel format identification
//!
//! Framebuffers are announced with a legacy `(bpp, depth)` pair; the
//! registry resolves that to a concrete format before a panel ever sees it.

/// Pixel formats the stack can name.
///
/// Only a subset is ever emitted by [`PixelFormat::from_legacy`]; the rest
/// exist so panel drivers can state what they accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelFormat {
    /// 8-bit indexed color
    C8,
    /// 16-bit, 1 bit unused
    Xrgb1555,
    /// 16-bit 5-6-5
    Rgb565,
    /// 24-bit packed
    Rgb888,
    /// 32-bit, top byte unused
    Xrgb8888,
    /// 32-bit 2-10-10-10
    Xrgb2101010,
    /// 32-bit with alpha
    Argb8888,
}

impl PixelFormat {
    /// Resolve a legacy `(bpp, depth)` pair.
    ///
    /// Unknown pairs fall back to [`PixelFormat::Xrgb8888`], matching what
    /// display servers assume when a driver stays silent.
    pub fn from_legacy(bpp: u32, depth: u32) -> PixelFormat {
        match bpp {
            8 => PixelFormat::C8,
            16 if depth == 15 => PixelFormat::Xrgb1555,
            16 => PixelFormat::Rgb565,
            24 => PixelFormat::Rgb888,
            32 => match depth {
                24 => PixelFormat::Xrgb8888,
                30 => PixelFormat::Xrgb2101010,
                _ => PixelFormat::Argb8888,
            },
            _ => PixelFormat::Xrgb8888,
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::C8 => 1,
            PixelFormat::Xrgb1555 | PixelFormat::Rgb565 => 2,
            PixelFormat::Rgb888 => 3,
            PixelFormat::Xrgb8888 | PixelFormat::Xrgb2101010 | PixelFormat::Argb8888 => 4,
        }
    }
}
