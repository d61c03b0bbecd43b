//! MIPI DBI Type C option 3 register bus
//!
//! Serial interface with a separate data/command pin: D/C is held low
//! while the command byte clocks out and high for its parameters. Pixel
//! payloads ride the same gather path, so zero-copy sources go straight
//! to the link.
//!
//! Reads are slow-clocked and carry a controller quirk: the Nokia-style
//! 24/32-bit read commands start with a dummy clock cycle, shifting the
//! whole response right by one bit. An extra byte is read and the result
//! reassembled bit by bit.

use skylt_core::buffer::Source;
use skylt_core::error::Error;
use skylt_core::regmap::{BusCaps, RegisterBus};
use skylt_core::trace::{TraceSink, Tracer, TRACE_DRIVER};
use skylt_core::transport::TransportChannel;
use skylt_hal::{ControlLink, OutputPin, Segment};

use crate::dcs;

/// Read clock ceiling; readback is far slower than writes on these panels
const DEFAULT_READ_SPEED_HZ: u32 = 2_000_000;

/// Largest raw read payload (display status plus the dummy byte fits)
const READ_MAX: usize = 7;

/// Register bus over an SPI-style link and a D/C pin
pub struct MipiDbiBus<L: ControlLink, P: OutputPin, S: TraceSink> {
    transport: TransportChannel<L>,
    dc: P,
    tracer: Tracer<S>,
    write_only: bool,
    chunk_size: usize,
}

impl<L: ControlLink, P: OutputPin, S: TraceSink> MipiDbiBus<L, P, S> {
    pub fn new(transport: TransportChannel<L>, dc: P, tracer: Tracer<S>, write_only: bool) -> Self {
        let chunk_size = transport.max_transfer_size(0);
        Self {
            transport,
            dc,
            tracer,
            write_only,
            chunk_size,
        }
    }

    pub fn transport(&self) -> &TransportChannel<L> {
        &self.transport
    }
}

impl<L: ControlLink, P: OutputPin, S: TraceSink> RegisterBus for MipiDbiBus<L, P, S> {
    fn caps(&self) -> BusCaps {
        BusCaps {
            write: true,
            gather_write: true,
            read: !self.write_only,
            max_raw_read: READ_MAX,
            ..BusCaps::default()
        }
    }

    fn gather_write(&mut self, reg: &[u8], val: Source<'_>) -> Result<(), Error> {
        if reg.len() != 1 {
            return Err(Error::InvalidArgument);
        }
        if self.tracer.enabled(TRACE_DRIVER) {
            self.tracer.line(
                TRACE_DRIVER,
                format_args!("cmd {:02x} len {}", reg[0], val.len()),
            );
            if let Source::Bytes(bytes) = val {
                self.tracer.hexdump8(TRACE_DRIVER, "par", bytes);
            }
        }

        self.dc.set_low();
        self.transport.transfer(
            &mut self.tracer,
            0,
            None,
            8,
            Source::Bytes(reg),
            1,
            None,
            self.chunk_size,
        )?;

        if !val.is_empty() {
            self.dc.set_high();
            let len = val.len();
            self.transport
                .transfer(&mut self.tracer, 0, None, 8, val, len, None, self.chunk_size)?;
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Err(Error::InvalidArgument);
        }
        self.gather_write(&[data[0]], Source::Bytes(&data[1..]))
    }

    fn read(&mut self, reg: &[u8], dst: &mut [u8]) -> Result<(), Error> {
        if self.write_only {
            return Err(Error::AccessDenied);
        }
        if reg.len() != 1 || dst.is_empty() || dst.len() > READ_MAX {
            return Err(Error::InvalidArgument);
        }
        let cmd = reg[0];
        let speed = DEFAULT_READ_SPEED_HZ.min(self.transport.link().default_speed_hz() / 2);

        // Nokia 24/32-bit read commands start with a dummy clock cycle
        let dummy = cmd == dcs::GET_DISPLAY_ID || cmd == dcs::GET_DISPLAY_STATUS;
        if dummy && !(dst.len() == 3 || dst.len() == 4) {
            return Err(Error::InvalidArgument);
        }
        let rx_len = dst.len() + usize::from(dummy);

        let mut rx = [0u8; READ_MAX + 1];
        self.dc.set_low();
        {
            let mut segments = [
                Segment::tx(reg, 8, speed),
                Segment::rx(&mut rx[..rx_len], 8, speed),
            ];
            self.transport.submit(&mut self.tracer, &mut segments)?;
        }

        if dummy {
            // Shift the dummy bit back out of the response
            for i in 0..dst.len() {
                dst[i] = (rx[i] << 1) | (rx[i + 1] >> 7);
            }
        } else {
            dst.copy_from_slice(&rx[..dst.len()]);
        }

        if self.tracer.enabled(TRACE_DRIVER) {
            self.tracer
                .line(TRACE_DRIVER, format_args!("read {:02x}", cmd));
            self.tracer.hexdump8(TRACE_DRIVER, "val", dst);
        }
        Ok(())
    }
}
