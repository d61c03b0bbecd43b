//! Device event records
//!
//! The controller writes one record per read. Unknown tags must not kill
//! the event loop, so [`DecodeError::UnknownTag`] carries the raw tag and
//! the caller answers with a not-implemented status instead of bailing.

use heapless::Vec;

/// Largest record the controller will ever write
pub const MAX_EVENT_SIZE: usize = 1024;

/// Maximum damage rectangles carried by one paint event
pub const MAX_CLIP_RECTS: usize = 8;

/// Event tags
pub const TAG_ENABLE: u32 = 1;
pub const TAG_DISABLE: u32 = 2;
pub const TAG_FB_CREATE: u32 = 3;
pub const TAG_FB_DESTROY: u32 = 4;
pub const TAG_FB_DIRTY: u32 = 5;

/// Damage rectangle, half-open: `x1 <= x < x2`, `y1 <= y < y2`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClipRect {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl ClipRect {
    pub fn width(&self) -> u16 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u16 {
        self.y2.saturating_sub(self.y1)
    }
}

/// Errors from decoding an event record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Record shorter than its layout requires
    Truncated,
    /// Tag not known to this protocol revision
    UnknownTag(u32),
    /// Paint event carries more rectangles than [`MAX_CLIP_RECTS`]
    TooManyRects,
}

/// One decoded controller event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceEvent {
    /// Pipeline switched on, the panel should start displaying
    Enable,
    /// Pipeline switched off
    Disable,
    /// Framebuffer `id` was created and may be painted to
    FbCreate { id: u32 },
    /// Framebuffer `id` was destroyed
    FbDestroy { id: u32 },
    /// Framebuffer `id` has damage to flush
    FbDirty {
        id: u32,
        flags: u32,
        color: u32,
        rects: Vec<ClipRect, MAX_CLIP_RECTS>,
    },
}

fn get_u32(buf: &[u8], off: usize) -> Result<u32, DecodeError> {
    let b = buf.get(off..off + 4).ok_or(DecodeError::Truncated)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn get_u16(buf: &[u8], off: usize) -> Result<u16, DecodeError> {
    let b = buf.get(off..off + 2).ok_or(DecodeError::Truncated)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

fn put_u32(buf: &mut Vec<u8, MAX_EVENT_SIZE>, v: u32) {
    // Capacity is checked by the encode caller's layout, never overflows
    let _ = buf.extend_from_slice(&v.to_le_bytes());
}

impl DeviceEvent {
    /// Decode one record
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let tag = get_u32(buf, 0)?;
        match tag {
            TAG_ENABLE => Ok(DeviceEvent::Enable),
            TAG_DISABLE => Ok(DeviceEvent::Disable),
            TAG_FB_CREATE => Ok(DeviceEvent::FbCreate {
                id: get_u32(buf, 4)?,
            }),
            TAG_FB_DESTROY => Ok(DeviceEvent::FbDestroy {
                id: get_u32(buf, 4)?,
            }),
            TAG_FB_DIRTY => {
                let id = get_u32(buf, 4)?;
                let flags = get_u32(buf, 8)?;
                let color = get_u32(buf, 12)?;
                let count = get_u32(buf, 16)? as usize;
                if count > MAX_CLIP_RECTS {
                    return Err(DecodeError::TooManyRects);
                }
                let mut rects = Vec::new();
                for i in 0..count {
                    let off = 20 + i * 8;
                    let rect = ClipRect {
                        x1: get_u16(buf, off)?,
                        y1: get_u16(buf, off + 2)?,
                        x2: get_u16(buf, off + 4)?,
                        y2: get_u16(buf, off + 6)?,
                    };
                    // Vec capacity equals MAX_CLIP_RECTS, count already checked
                    let _ = rects.push(rect);
                }
                Ok(DeviceEvent::FbDirty {
                    id,
                    flags,
                    color,
                    rects,
                })
            }
            other => Err(DecodeError::UnknownTag(other)),
        }
    }

    /// Encode this event into its wire form (used by tests and simulators)
    pub fn encode(&self) -> Vec<u8, MAX_EVENT_SIZE> {
        let mut buf = Vec::new();
        match self {
            DeviceEvent::Enable => put_u32(&mut buf, TAG_ENABLE),
            DeviceEvent::Disable => put_u32(&mut buf, TAG_DISABLE),
            DeviceEvent::FbCreate { id } => {
                put_u32(&mut buf, TAG_FB_CREATE);
                put_u32(&mut buf, *id);
            }
            DeviceEvent::FbDestroy { id } => {
                put_u32(&mut buf, TAG_FB_DESTROY);
                put_u32(&mut buf, *id);
            }
            DeviceEvent::FbDirty {
                id,
                flags,
                color,
                rects,
            } => {
                put_u32(&mut buf, TAG_FB_DIRTY);
                put_u32(&mut buf, *id);
                put_u32(&mut buf, *flags);
                put_u32(&mut buf, *color);
                put_u32(&mut buf, rects.len() as u32);
                for rect in rects {
                    let _ = buf.extend_from_slice(&rect.x1.to_le_bytes());
                    let _ = buf.extend_from_slice(&rect.y1.to_le_bytes());
                    let _ = buf.extend_from_slice(&rect.x2.to_le_bytes());
                    let _ = buf.extend_from_slice(&rect.y2.to_le_bytes());
                }
            }
        }
        buf
    }
}
