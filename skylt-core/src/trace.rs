//! Category-masked diagnostics
//!
//! Tracing is carried explicitly by the objects that emit it instead of
//! through process-global state; a [`Tracer`] owns its category mask and
//! its sink, so two devices can trace at different verbosity.

use core::fmt::{self, Write as _};

use heapless::String;

/// Nothing enabled
pub const TRACE_NONE: u32 = 0;
/// Core transport and registry paths
pub const TRACE_CORE: u32 = 0x01;
/// Panel driver register traffic
pub const TRACE_DRIVER: u32 = 0x02;
/// Event loop and lifecycle
pub const TRACE_KMS: u32 = 0x04;

/// Max units (bytes or words) rendered before a dump is elided
const DUMP_LIMIT: usize = 16;

/// Receiver for rendered trace lines
pub trait TraceSink {
    fn write_line(&mut self, line: &str);
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn write_line(&mut self, _line: &str) {}
}

/// Category-filtered trace emitter
pub struct Tracer<S: TraceSink> {
    mask: u32,
    sink: S,
}

impl<S: TraceSink> Tracer<S> {
    pub fn new(mask: u32, sink: S) -> Self {
        Self { mask, sink }
    }

    /// Whether lines in `category` would be emitted
    pub fn enabled(&self, category: u32) -> bool {
        self.mask & category != 0
    }

    /// Emit one formatted line if `category` is enabled.
    ///
    /// Lines longer than the internal buffer are truncated, never dropped.
    pub fn line(&mut self, category: u32, args: fmt::Arguments<'_>) {
        if !self.enabled(category) {
            return;
        }
        let mut buf: String<128> = String::new();
        let _ = buf.write_fmt(args);
        self.sink.write_line(&buf);
    }

    /// Emit a labelled byte dump, elided past [`DUMP_LIMIT`] bytes
    pub fn hexdump8(&mut self, category: u32, label: &str, data: &[u8]) {
        if !self.enabled(category) {
            return;
        }
        let mut buf: String<128> = String::new();
        let _ = write!(buf, "{}:", label);
        for byte in data.iter().take(DUMP_LIMIT) {
            let _ = write!(buf, " {:02x}", byte);
        }
        if data.len() > DUMP_LIMIT {
            let _ = write!(buf, " .. ({} bytes)", data.len());
        }
        self.sink.write_line(&buf);
    }

    /// Emit a labelled 16-bit word dump (little-endian pairs)
    pub fn hexdump16(&mut self, category: u32, label: &str, data: &[u8]) {
        if !self.enabled(category) {
            return;
        }
        let mut buf: String<128> = String::new();
        let _ = write!(buf, "{}:", label);
        let words = data.len() / 2;
        for i in 0..words.min(DUMP_LIMIT) {
            let w = u16::from_le_bytes([data[i * 2], data[i * 2 + 1]]);
            let _ = write!(buf, " {:04x}", w);
        }
        if words > DUMP_LIMIT {
            let _ = write!(buf, " .. ({} words)", words);
        }
        self.sink.write_line(&buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CaptureSink {
        lines: heapless::Vec<String<128>, 8>,
    }

    impl CaptureSink {
        fn new() -> Self {
            Self {
                lines: heapless::Vec::new(),
            }
        }
    }

    impl TraceSink for &mut CaptureSink {
        fn write_line(&mut self, line: &str) {
            let mut s = String::new();
            let _ = s.push_str(line);
            let _ = self.lines.push(s);
        }
    }

    #[test]
    fn test_mask_filters_categories() {
        let mut sink = CaptureSink::new();
        {
            let mut tracer = Tracer::new(TRACE_CORE, &mut sink);
            tracer.line(TRACE_CORE, format_args!("core on"));
            tracer.line(TRACE_DRIVER, format_args!("driver off"));
        }
        assert_eq!(sink.lines.len(), 1);
        assert_eq!(sink.lines[0].as_str(), "core on");
    }

    #[test]
    fn test_hexdump8_elides_long_dumps() {
        let mut sink = CaptureSink::new();
        {
            let mut tracer = Tracer::new(TRACE_DRIVER, &mut sink);
            let data = [0xabu8; 20];
            tracer.hexdump8(TRACE_DRIVER, "reg", &data);
        }
        let line = sink.lines[0].as_str();
        assert!(line.starts_with("reg: ab"));
        assert!(line.ends_with("(20 bytes)"));
    }

    #[test]
    fn test_hexdump16_renders_words() {
        let mut sink = CaptureSink::new();
        {
            let mut tracer = Tracer::new(TRACE_CORE, &mut sink);
            tracer.hexdump16(TRACE_CORE, "px", &[0x34, 0x12, 0x78, 0x56]);
        }
        assert_eq!(sink.lines[0].as_str(), "px: 1234 5678");
    }
}
