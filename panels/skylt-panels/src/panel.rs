//! Generic MIPI-DBI panel plumbing
//!
//! Everything ILI9341-class controllers share: DCS writes through a
//! register map, hardware reset timing, power-mode probing, and the flush
//! path that sets the address window and streams pixels from the shared
//! buffer. The first flush after enable is also where the backlight goes
//! on, so the panel never shows an uninitialized frame.

use embedded_hal::delay::DelayNs;
use skylt_core::buffer::BufferHandle;
use skylt_core::device::DeviceState;
use skylt_core::error::Error;
use skylt_core::regmap::{RegisterBus, RegisterMap, RegmapConfig};
use skylt_core::Source;
use skylt_hal::{Backlight, BufferBacking, OutputPin};
use skylt_protocol::ClipRect;

use crate::dcs;

/// Shared panel state over a DBI register bus
pub struct MipiDbi<R, RST, BL, D>
where
    R: RegisterBus,
    RST: OutputPin,
    BL: Backlight,
    D: DelayNs,
{
    regmap: RegisterMap<R>,
    reset: Option<RST>,
    backlight: Option<BL>,
    delay: D,
    /// Wait after the first flush before lighting the backlight
    enable_delay_ms: u32,
    pub rotation: u16,
}

impl<R, RST, BL, D> MipiDbi<R, RST, BL, D>
where
    R: RegisterBus,
    RST: OutputPin,
    BL: Backlight,
    D: DelayNs,
{
    pub fn new(
        bus: R,
        reset: Option<RST>,
        backlight: Option<BL>,
        delay: D,
        enable_delay_ms: u32,
        rotation: u16,
    ) -> Result<Self, Error> {
        let regmap = RegisterMap::new(bus, RegmapConfig::default())?;
        Ok(Self {
            regmap,
            reset,
            backlight,
            delay,
            enable_delay_ms,
            rotation,
        })
    }

    /// Write one DCS command with parameters
    pub fn dcs_write(&mut self, cmd: u8, params: &[u8]) -> Result<(), Error> {
        self.regmap.raw_write(cmd as u32, Source::Bytes(params))
    }

    pub fn bus(&self) -> &R {
        self.regmap.bus()
    }

    pub fn backlight(&self) -> Option<&BL> {
        self.backlight.as_ref()
    }

    pub fn sleep_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Pulse the reset pin: 20us low, then 120ms for the controller to
    /// come back up. A missing pin is a no-op.
    pub fn hw_reset(&mut self) {
        let Some(reset) = self.reset.as_mut() else {
            return;
        };
        reset.set_low();
        self.delay.delay_us(20);
        reset.set_high();
        self.delay.delay_ms(120);
    }

    /// Probe whether a bootloader already brought the display up
    pub fn display_is_on(&mut self) -> bool {
        let mut val = [0u8];
        if self.regmap.raw_read(dcs::GET_POWER_MODE as u32, &mut val).is_err() {
            return false;
        }
        let mode = val[0] & !dcs::power_mode::RESERVED_MASK;
        mode == (dcs::power_mode::DISPLAY_ON
            | dcs::power_mode::NORMAL_MODE
            | dcs::power_mode::SLEEP_OUT)
    }

    /// Switch the panel dark
    pub fn disable(&mut self, state: &mut DeviceState) -> Result<(), Error> {
        if state.enabled {
            if let Some(backlight) = self.backlight.as_mut() {
                backlight.set_power(false).map_err(|_| Error::Resource)?;
            }
        }
        state.enabled = false;
        Ok(())
    }

    /// Flush one damage rectangle from the shared buffer.
    ///
    /// The address window's end bytes keep the controller's historical
    /// encoding: high byte from the exclusive bound, low byte inclusive.
    pub fn flush_rect<B: BufferBacking>(
        &mut self,
        state: &mut DeviceState,
        buffer: &mut BufferHandle<B>,
        rect: ClipRect,
    ) -> Result<(), Error> {
        self.dcs_write(
            dcs::SET_COLUMN_ADDRESS,
            &[
                (rect.x1 >> 8) as u8,
                rect.x1 as u8,
                (rect.x2 >> 8) as u8,
                rect.x2.wrapping_sub(1) as u8,
            ],
        )?;
        self.dcs_write(
            dcs::SET_PAGE_ADDRESS,
            &[
                (rect.y1 >> 8) as u8,
                rect.y1 as u8,
                (rect.y2 >> 8) as u8,
                rect.y2.wrapping_sub(1) as u8,
            ],
        )?;

        let len = rect.width() as usize * rect.height() as usize * 2;
        if len > buffer.size() {
            return Err(Error::Size);
        }

        buffer.begin_access()?;
        let result = self
            .regmap
            .raw_write(dcs::WRITE_MEMORY_START as u32, buffer.source(len));
        buffer.end_access()?;
        result?;

        if !state.enabled {
            if self.enable_delay_ms > 0 {
                self.delay.delay_ms(self.enable_delay_ms);
            }
            if let Some(backlight) = self.backlight.as_mut() {
                backlight.set_power(true).map_err(|_| Error::Resource)?;
            }
            state.enabled = true;
        }
        Ok(())
    }
}
