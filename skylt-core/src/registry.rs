//! Framebuffer registry
//!
//! Tracks the framebuffers the controller has announced, newest first.
//! Lookups hit the most recently created entry, which is almost always
//! the one being painted; duplicate ids are tolerated and shadow older
//! entries until destroyed.

use heapless::Vec;

use crate::error::Error;
use crate::format::PixelFormat;
use crate::trace::{TraceSink, Tracer, TRACE_KMS};

/// Most framebuffers tracked at once
pub const MAX_FRAMEBUFFERS: usize = 8;

/// Geometry the controller reports for a framebuffer id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FramebufferInfo {
    pub handle: u32,
    pub pitch: u32,
    pub width: u32,
    pub height: u32,
    pub bpp: u32,
    pub depth: u32,
}

/// Source of framebuffer geometry, queried on create events
pub trait GeometrySource {
    fn framebuffer_info(&mut self, id: u32) -> Result<FramebufferInfo, Error>;
}

/// One tracked framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Framebuffer {
    pub id: u32,
    pub handle: u32,
    pub pitch: u32,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// Registry of live framebuffers
#[derive(Default)]
pub struct FramebufferRegistry {
    fbs: Vec<Framebuffer, MAX_FRAMEBUFFERS>,
}

impl FramebufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fbs.is_empty()
    }

    /// Track a newly created framebuffer.
    ///
    /// XRGB8888 is accepted for compatibility with display servers that
    /// never ask, and downgraded to RGB565 for the panel.
    pub fn create<G: GeometrySource, S: TraceSink>(
        &mut self,
        geometry: &mut G,
        id: u32,
        trace: &mut Tracer<S>,
    ) -> Result<(), Error> {
        let info = geometry.framebuffer_info(id)?;
        let mut format = PixelFormat::from_legacy(info.bpp, info.depth);
        if format == PixelFormat::Xrgb8888 {
            trace.line(
                TRACE_KMS,
                format_args!("fb {}: xrgb8888 emulated as rgb565", id),
            );
            format = PixelFormat::Rgb565;
        }
        let fb = Framebuffer {
            id,
            handle: info.handle,
            pitch: info.pitch,
            width: info.width,
            height: info.height,
            format,
        };
        self.fbs.insert(0, fb).map_err(|_| Error::Resource)?;
        trace.line(
            TRACE_KMS,
            format_args!("fb {}: {}x{} pitch {}", id, fb.width, fb.height, fb.pitch),
        );
        Ok(())
    }

    /// Drop the newest entry with `id`
    pub fn destroy(&mut self, id: u32) -> Result<(), Error> {
        let pos = self
            .fbs
            .iter()
            .position(|fb| fb.id == id)
            .ok_or(Error::NotFound)?;
        self.fbs.remove(pos);
        Ok(())
    }

    /// Newest entry with `id`
    pub fn find(&self, id: u32) -> Option<&Framebuffer> {
        self.fbs.iter().find(|fb| fb.id == id)
    }
}
