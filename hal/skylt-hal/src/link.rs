//! Wire-link abstractions
//!
//! A [`ControlLink`] carries fixed-capacity control requests of one or two
//! message segments, the shape an SPI character device exposes. The core
//! transport layer breaks large pixel streams into link-sized chunks; the
//! link itself only ever sees a bounded request.

/// Capability mask bit for a given word width, lowest bit = 1 bit per word.
pub const fn word_mask(bits: u8) -> u32 {
    1 << (bits - 1)
}

/// Identity of a kernel-shared buffer usable as a zero-copy segment source.
///
/// The link backend resolves the id to the actual resource (on Linux this
/// would be a dma-buf file descriptor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferId(pub i32);

/// Errors reported by a control link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The control request failed in the backend
    Io,
    /// Requested word width or feature not supported by this link
    Unsupported,
    /// Segment exceeds the link's fixed capacity
    TooLong,
}

/// Payload of one message segment
pub enum SegmentData<'a> {
    /// Transmit from an in-memory buffer
    Tx(&'a [u8]),
    /// Transmit from a shared buffer, starting at a byte offset
    TxShared { id: BufferId, offset: usize },
    /// Receive into an in-memory buffer
    Rx(&'a mut [u8]),
}

impl SegmentData<'_> {
    /// True for the zero-copy transmit variant
    pub fn is_shared(&self) -> bool {
        matches!(self, SegmentData::TxShared { .. })
    }
}

/// One message segment of a control request
pub struct Segment<'a> {
    /// Word width for this segment (8 or 16)
    pub bits_per_word: u8,
    /// Clock speed in Hz, 0 for the link default
    pub speed_hz: u32,
    /// Number of bytes to move
    pub len: usize,
    /// Segment payload
    pub data: SegmentData<'a>,
}

impl<'a> Segment<'a> {
    /// Transmit segment over an in-memory buffer
    pub fn tx(buf: &'a [u8], bits_per_word: u8, speed_hz: u32) -> Self {
        Self {
            bits_per_word,
            speed_hz,
            len: buf.len(),
            data: SegmentData::Tx(buf),
        }
    }

    /// Receive segment into an in-memory buffer
    pub fn rx(buf: &'a mut [u8], bits_per_word: u8, speed_hz: u32) -> Self {
        let len = buf.len();
        Self {
            bits_per_word,
            speed_hz,
            len,
            data: SegmentData::Rx(buf),
        }
    }
}

/// Optional header prepended to every chunk of a chunked transfer.
///
/// Headers are transmit-only and carry their own word width and speed.
#[derive(Debug, Clone, Copy)]
pub struct HeaderSegment<'a> {
    pub bits_per_word: u8,
    pub speed_hz: u32,
    pub tx: &'a [u8],
}

/// Byte-oriented wire link with fixed per-request capacity
///
/// A request is one or two segments executed back to back under one chip
/// select. Requests are synchronous; there is no queueing or cancellation.
pub trait ControlLink {
    /// Maximum bytes in one in-memory segment
    fn max_len(&self) -> usize;

    /// Maximum bytes in one shared-buffer (DMA) segment
    fn max_dma_len(&self) -> usize;

    /// Supported word widths as a capability mask (see [`word_mask`])
    fn word_width_mask(&self) -> u32;

    /// Default clock speed in Hz
    fn default_speed_hz(&self) -> u32;

    /// Execute one control request of 1-2 segments
    fn submit(&mut self, segments: &mut [Segment<'_>]) -> Result<(), LinkError>;

    /// Whether the link can natively clock out the given word width
    fn supports_word_width(&self, bits: u8) -> bool {
        self.word_width_mask() & word_mask(bits) != 0
    }
}
