//! Chunked wire transport
//!
//! A [`ControlLink`] moves at most a fixed number of bytes per request;
//! pixel streams are far larger. The transport breaks a stream into
//! link-sized chunks, prepending the caller's header segment to every
//! chunk so the peripheral sees each one as a complete command.
//!
//! Word order is handled here too: a 16-bit stream over a link that only
//! clocks 8-bit words is byte-swapped chunk by chunk on little-endian
//! hosts, using a caller-provided scratch buffer.

use skylt_hal::{ControlLink, HeaderSegment, Segment, SegmentData};

use crate::buffer::Source;
use crate::error::Error;
use crate::trace::{TraceSink, Tracer, TRACE_CORE};

/// Chunking transport over a control link
pub struct TransportChannel<L: ControlLink> {
    link: L,
    /// Process-wide ceiling on chunk size, `None` for no extra cap
    global_cap: Option<usize>,
}

impl<L: ControlLink> TransportChannel<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            global_cap: None,
        }
    }

    /// Apply an additional ceiling on top of the link's own limit
    pub fn with_cap(link: L, cap: usize) -> Self {
        Self {
            link,
            global_cap: Some(cap),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Largest chunk a transfer may use, given an optional caller cap.
    ///
    /// The result is rounded down to a multiple of 4 and never below 4, so
    /// 16-bit and 32-bit payloads always chunk on value boundaries.
    pub fn max_transfer_size(&self, cap: usize) -> usize {
        let mut size = self.link.max_len();
        if cap != 0 {
            size = size.min(cap);
        }
        if let Some(global) = self.global_cap {
            if global != 0 {
                size = size.min(global);
            }
        }
        size &= !0x3;
        size.max(4)
    }

    /// Submit one raw request of 1-2 segments
    pub fn submit<S: TraceSink>(
        &mut self,
        trace: &mut Tracer<S>,
        segments: &mut [Segment<'_>],
    ) -> Result<(), Error> {
        if trace.enabled(TRACE_CORE) {
            for seg in segments.iter() {
                if let SegmentData::Tx(bytes) = &seg.data {
                    trace.hexdump8(TRACE_CORE, "tx", bytes);
                }
            }
        }
        self.link.submit(segments)?;
        Ok(())
    }

    /// Stream `len` bytes from `source`, chunked to fit the link.
    ///
    /// A `speed_hz` of 0 resolves to the link's default speed before any
    /// data segment is built.
    ///
    /// `header` is retransmitted in front of every chunk. `swap_buf` must
    /// be provided (at least one chunk large) when a 16-bit transfer needs
    /// the 8-bit byte-swap fallback; shared sources cannot be swapped.
    /// On error the remaining chunks are not sent.
    #[allow(clippy::too_many_arguments)]
    pub fn transfer<S: TraceSink>(
        &mut self,
        trace: &mut Tracer<S>,
        speed_hz: u32,
        header: Option<HeaderSegment<'_>>,
        bits_per_word: u8,
        source: Source<'_>,
        len: usize,
        mut swap_buf: Option<&mut [u8]>,
        max_chunk: usize,
    ) -> Result<(), Error> {
        if bits_per_word != 8 && bits_per_word != 16 {
            return Err(Error::InvalidArgument);
        }
        if bits_per_word == 16 && len % 2 != 0 {
            return Err(Error::InvalidArgument);
        }
        if source.len() < len {
            return Err(Error::InvalidArgument);
        }

        let speed_hz = if speed_hz == 0 {
            self.link.default_speed_hz()
        } else {
            speed_hz
        };

        let mut chunk_cap = self.max_transfer_size(max_chunk);
        if matches!(source, Source::Shared { .. }) {
            // Shared buffers move by DMA; the DMA ceiling replaces the
            // in-memory request limit rather than tightening it.
            chunk_cap = self.link.max_dma_len();
        }

        let swap = bits_per_word == 16
            && cfg!(target_endian = "little")
            && !self.link.supports_word_width(16);
        let eff_bits = if swap { 8 } else { bits_per_word };

        if trace.enabled(TRACE_CORE) {
            trace.line(
                TRACE_CORE,
                format_args!(
                    "transfer len={} bpw={} chunk={} swap={}",
                    len, bits_per_word, chunk_cap, swap
                ),
            );
        }

        let mut offset = 0usize;
        while offset < len {
            let chunk = (len - offset).min(chunk_cap);
            match source {
                Source::Bytes(bytes) => {
                    let part = &bytes[offset..offset + chunk];
                    if swap {
                        let buf = swap_buf.as_deref_mut().ok_or(Error::InvalidArgument)?;
                        if buf.len() < chunk {
                            return Err(Error::Size);
                        }
                        for i in (0..chunk).step_by(2) {
                            buf[i] = part[i + 1];
                            buf[i + 1] = part[i];
                        }
                        let data = Segment::tx(&buf[..chunk], eff_bits, speed_hz);
                        submit_chunk(&mut self.link, header, data)?;
                    } else {
                        let data = Segment::tx(part, eff_bits, speed_hz);
                        submit_chunk(&mut self.link, header, data)?;
                    }
                }
                Source::Shared { id, .. } => {
                    if swap {
                        return Err(Error::InvalidArgument);
                    }
                    let data = Segment {
                        bits_per_word: eff_bits,
                        speed_hz,
                        len: chunk,
                        data: SegmentData::TxShared { id, offset },
                    };
                    submit_chunk(&mut self.link, header, data)?;
                }
            }
            offset += chunk;
        }
        Ok(())
    }
}

fn submit_chunk<L: ControlLink>(
    link: &mut L,
    header: Option<HeaderSegment<'_>>,
    data: Segment<'_>,
) -> Result<(), Error> {
    match header {
        Some(h) => {
            let mut segments = [Segment::tx(h.tx, h.bits_per_word, h.speed_hz), data];
            link.submit(&mut segments)?;
        }
        None => {
            let mut segments = [data];
            link.submit(&mut segments)?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use skylt_hal::{word_mask, ControlLink, LinkError, Segment, SegmentData};

    /// One recorded segment of a submitted request
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum SentData {
        Bytes(heapless::Vec<u8, 64>),
        Shared { id: i32, offset: usize, len: usize },
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Sent {
        pub bits_per_word: u8,
        pub speed_hz: u32,
        pub data: SentData,
    }

    /// Link fake with configurable limits, recording every segment
    pub struct MockLink {
        pub max_len: usize,
        pub max_dma_len: usize,
        pub word_widths: u32,
        pub default_speed: u32,
        pub sent: heapless::Vec<Sent, 32>,
        pub fail_after: Option<usize>,
        pub submits: usize,
    }

    impl MockLink {
        pub fn new(max_len: usize) -> Self {
            Self {
                max_len,
                max_dma_len: max_len,
                word_widths: word_mask(8),
                default_speed: 32_000_000,
                sent: heapless::Vec::new(),
                fail_after: None,
                submits: 0,
            }
        }

        pub fn with_16bit(mut self) -> Self {
            self.word_widths |= word_mask(16);
            self
        }
    }

    impl ControlLink for MockLink {
        fn max_len(&self) -> usize {
            self.max_len
        }

        fn max_dma_len(&self) -> usize {
            self.max_dma_len
        }

        fn word_width_mask(&self) -> u32 {
            self.word_widths
        }

        fn default_speed_hz(&self) -> u32 {
            self.default_speed
        }

        fn submit(&mut self, segments: &mut [Segment<'_>]) -> Result<(), LinkError> {
            if let Some(limit) = self.fail_after {
                if self.submits >= limit {
                    return Err(LinkError::Io);
                }
            }
            self.submits += 1;
            for seg in segments.iter_mut() {
                let data = match &mut seg.data {
                    SegmentData::Tx(bytes) => {
                        let mut copy = heapless::Vec::new();
                        copy.extend_from_slice(bytes).map_err(|_| LinkError::TooLong)?;
                        SentData::Bytes(copy)
                    }
                    SegmentData::TxShared { id, offset } => SentData::Shared {
                        id: id.0,
                        offset: *offset,
                        len: seg.len,
                    },
                    SegmentData::Rx(buf) => {
                        buf.fill(0);
                        continue;
                    }
                };
                self.sent
                    .push(Sent {
                        bits_per_word: seg.bits_per_word,
                        speed_hz: seg.speed_hz,
                        data,
                    })
                    .map_err(|_| LinkError::TooLong)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{MockLink, SentData};
    use super::*;
    use crate::trace::{NullSink, TRACE_NONE};
    use skylt_hal::BufferId;

    fn tracer() -> Tracer<NullSink> {
        Tracer::new(TRACE_NONE, NullSink)
    }

    #[test]
    fn test_max_transfer_size_rounds_down() {
        let channel = TransportChannel::new(MockLink::new(4096));
        assert_eq!(channel.max_transfer_size(0), 4096);
        assert_eq!(channel.max_transfer_size(7), 4);
        assert_eq!(channel.max_transfer_size(100), 100);
        assert_eq!(channel.max_transfer_size(102), 100);
        // floor at one 32-bit value even for absurd caps
        assert_eq!(channel.max_transfer_size(1), 4);
    }

    #[test]
    fn test_global_cap_applies() {
        let channel = TransportChannel::with_cap(MockLink::new(4096), 64);
        assert_eq!(channel.max_transfer_size(0), 64);
        assert_eq!(channel.max_transfer_size(32), 32);
    }

    #[test]
    fn test_chunks_reassemble_input() {
        let mut channel = TransportChannel::new(MockLink::new(8).with_16bit());
        let mut trace = tracer();
        let data: [u8; 20] = core::array::from_fn(|i| i as u8);

        channel
            .transfer(&mut trace, 0, None, 8, Source::Bytes(&data), 20, None, 0)
            .unwrap();

        // ceil(20/8) = 3 requests
        assert_eq!(channel.link.sent.len(), 3);
        let mut rebuilt = heapless::Vec::<u8, 64>::new();
        for sent in &channel.link.sent {
            match &sent.data {
                SentData::Bytes(b) => rebuilt.extend_from_slice(b).unwrap(),
                _ => panic!("expected in-memory segment"),
            }
        }
        assert_eq!(rebuilt.as_slice(), &data);
    }

    #[test]
    fn test_header_prepended_to_every_chunk() {
        let mut channel = TransportChannel::new(MockLink::new(8).with_16bit());
        let mut trace = tracer();
        let header_bytes = [0x2c];
        let header = HeaderSegment {
            bits_per_word: 8,
            speed_hz: 0,
            tx: &header_bytes,
        };
        let data = [0u8; 16];

        channel
            .transfer(
                &mut trace,
                0,
                Some(header),
                8,
                Source::Bytes(&data),
                16,
                None,
                0,
            )
            .unwrap();

        // two chunks, each preceded by the header segment
        assert_eq!(channel.link.sent.len(), 4);
        for pair in channel.link.sent.chunks(2) {
            assert_eq!(pair[0].data, SentData::Bytes(heapless::Vec::from_slice(&[0x2c]).unwrap()));
        }
    }

    #[test]
    fn test_swap_fallback_on_8bit_link() {
        // link clocks only 8-bit words, host is little-endian in CI
        let mut channel = TransportChannel::new(MockLink::new(64));
        let mut trace = tracer();
        let data = [0x12, 0x34, 0x56, 0x78];
        let mut swap = [0u8; 64];

        channel
            .transfer(
                &mut trace,
                0,
                None,
                16,
                Source::Bytes(&data),
                4,
                Some(&mut swap),
                0,
            )
            .unwrap();

        let sent = &channel.link.sent[0];
        assert_eq!(sent.bits_per_word, 8);
        if cfg!(target_endian = "little") {
            assert_eq!(
                sent.data,
                SentData::Bytes(heapless::Vec::from_slice(&[0x34, 0x12, 0x78, 0x56]).unwrap())
            );
        }
    }

    #[test]
    fn test_swap_without_scratch_is_rejected() {
        let mut channel = TransportChannel::new(MockLink::new(64));
        let mut trace = tracer();
        let data = [0u8; 4];
        let result =
            channel.transfer(&mut trace, 0, None, 16, Source::Bytes(&data), 4, None, 0);
        if cfg!(target_endian = "little") {
            assert_eq!(result, Err(Error::InvalidArgument));
        }
    }

    #[test]
    fn test_native_16bit_link_skips_swap() {
        let mut channel = TransportChannel::new(MockLink::new(64).with_16bit());
        let mut trace = tracer();
        let data = [0x12, 0x34];

        channel
            .transfer(&mut trace, 0, None, 16, Source::Bytes(&data), 2, None, 0)
            .unwrap();

        let sent = &channel.link.sent[0];
        assert_eq!(sent.bits_per_word, 16);
        assert_eq!(
            sent.data,
            SentData::Bytes(heapless::Vec::from_slice(&[0x12, 0x34]).unwrap())
        );
    }

    #[test]
    fn test_shared_source_advances_offset() {
        let mut link = MockLink::new(16).with_16bit();
        link.max_dma_len = 8;
        let mut channel = TransportChannel::new(link);
        let mut trace = tracer();

        channel
            .transfer(
                &mut trace,
                0,
                None,
                8,
                Source::Shared {
                    id: BufferId(3),
                    len: 20,
                },
                20,
                None,
                0,
            )
            .unwrap();

        let offsets: heapless::Vec<(usize, usize), 8> = channel
            .link
            .sent
            .iter()
            .map(|s| match s.data {
                SentData::Shared { offset, len, .. } => (offset, len),
                _ => panic!("expected shared segment"),
            })
            .collect();
        assert_eq!(offsets.as_slice(), &[(0, 8), (8, 8), (16, 4)]);
    }

    #[test]
    fn test_shared_dma_ceiling_replaces_request_limit() {
        // DMA moves more per request than the in-memory path allows
        let mut link = MockLink::new(8).with_16bit();
        link.max_dma_len = 32;
        let mut channel = TransportChannel::new(link);
        let mut trace = tracer();

        channel
            .transfer(
                &mut trace,
                0,
                None,
                8,
                Source::Shared {
                    id: BufferId(7),
                    len: 32,
                },
                32,
                None,
                0,
            )
            .unwrap();

        assert_eq!(channel.link.sent.len(), 1);
        assert_eq!(
            channel.link.sent[0].data,
            SentData::Shared {
                id: 7,
                offset: 0,
                len: 32,
            }
        );
    }

    #[test]
    fn test_zero_speed_resolves_to_link_default() {
        let mut channel = TransportChannel::new(MockLink::new(64).with_16bit());
        let mut trace = tracer();
        let data = [0u8; 4];

        channel
            .transfer(&mut trace, 0, None, 8, Source::Bytes(&data), 4, None, 0)
            .unwrap();
        assert_eq!(channel.link.sent[0].speed_hz, 32_000_000);

        channel
            .transfer(&mut trace, 1_000_000, None, 8, Source::Bytes(&data), 4, None, 0)
            .unwrap();
        assert_eq!(channel.link.sent[1].speed_hz, 1_000_000);
    }

    #[test]
    fn test_shared_source_cannot_swap() {
        let mut channel = TransportChannel::new(MockLink::new(64));
        let mut trace = tracer();
        let mut swap = [0u8; 64];
        let result = channel.transfer(
            &mut trace,
            0,
            None,
            16,
            Source::Shared {
                id: BufferId(1),
                len: 4,
            },
            4,
            Some(&mut swap),
            0,
        );
        if cfg!(target_endian = "little") {
            assert_eq!(result, Err(Error::InvalidArgument));
        }
    }

    #[test]
    fn test_error_aborts_remaining_chunks() {
        let mut link = MockLink::new(4).with_16bit();
        link.fail_after = Some(2);
        let mut channel = TransportChannel::new(link);
        let mut trace = tracer();
        let data = [0u8; 16];

        let result =
            channel.transfer(&mut trace, 0, None, 8, Source::Bytes(&data), 16, None, 0);
        assert_eq!(result, Err(Error::Resource));
        assert_eq!(channel.link.submits, 2);
    }

    #[test]
    fn test_invalid_word_width_rejected() {
        let mut channel = TransportChannel::new(MockLink::new(64));
        let mut trace = tracer();
        let data = [0u8; 4];
        assert_eq!(
            channel.transfer(&mut trace, 0, None, 9, Source::Bytes(&data), 4, None, 0),
            Err(Error::InvalidArgument)
        );
    }
}
