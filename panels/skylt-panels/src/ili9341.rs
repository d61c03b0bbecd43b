//! ILI9341 panel driver (Multi-Inno MI0283QT class modules)

use embedded_hal::delay::DelayNs;
use skylt_core::buffer::BufferHandle;
use skylt_core::device::{DeviceState, PanelOps};
use skylt_core::error::Error;
use skylt_core::regmap::RegisterBus;
use skylt_core::registry::Framebuffer;
use skylt_hal::{Backlight, BufferBacking, OutputPin};
use skylt_protocol::ClipRect;

use crate::dcs;
use crate::panel::MipiDbi;

pub const ILI9341_FRMCTR1: u8 = 0xb1;
pub const ILI9341_DISCTRL: u8 = 0xb6;
pub const ILI9341_ETMOD: u8 = 0xb7;
pub const ILI9341_PWCTRL1: u8 = 0xc0;
pub const ILI9341_PWCTRL2: u8 = 0xc1;
pub const ILI9341_VMCTRL1: u8 = 0xc5;
pub const ILI9341_VMCTRL2: u8 = 0xc7;
pub const ILI9341_PWCTRLA: u8 = 0xcb;
pub const ILI9341_PWCTRLB: u8 = 0xcf;
pub const ILI9341_PGAMCTRL: u8 = 0xe0;
pub const ILI9341_NGAMCTRL: u8 = 0xe1;
pub const ILI9341_DTCTRLA: u8 = 0xe8;
pub const ILI9341_DTCTRLB: u8 = 0xea;
pub const ILI9341_PWRSEQ: u8 = 0xed;
pub const ILI9341_EN3GAM: u8 = 0xf2;
pub const ILI9341_PUMPCTRL: u8 = 0xf7;

pub const ILI9341_MADCTL_MH: u8 = 1 << 2;
pub const ILI9341_MADCTL_BGR: u8 = 1 << 3;
pub const ILI9341_MADCTL_ML: u8 = 1 << 4;
pub const ILI9341_MADCTL_MV: u8 = 1 << 5;
pub const ILI9341_MADCTL_MX: u8 = 1 << 6;
pub const ILI9341_MADCTL_MY: u8 = 1 << 7;

/// ILI9341 over a DBI register bus
pub struct Ili9341<R, RST, BL, D>
where
    R: RegisterBus,
    RST: OutputPin,
    BL: Backlight,
    D: DelayNs,
{
    dbi: MipiDbi<R, RST, BL, D>,
}

impl<R, RST, BL, D> Ili9341<R, RST, BL, D>
where
    R: RegisterBus,
    RST: OutputPin,
    BL: Backlight,
    D: DelayNs,
{
    pub fn new(dbi: MipiDbi<R, RST, BL, D>) -> Self {
        Self { dbi }
    }

    fn addr_mode(&self) -> u8 {
        let mode = match self.dbi.rotation {
            90 => ILI9341_MADCTL_MY,
            180 => ILI9341_MADCTL_MV,
            270 => ILI9341_MADCTL_MX,
            _ => ILI9341_MADCTL_MV | ILI9341_MADCTL_MY | ILI9341_MADCTL_MX,
        };
        mode | ILI9341_MADCTL_BGR
    }

    fn init(&mut self) -> Result<(), Error> {
        self.dbi.hw_reset();
        self.dbi.dcs_write(dcs::SOFT_RESET, &[])?;
        self.dbi.sleep_ms(20);

        self.dbi.dcs_write(dcs::SET_DISPLAY_OFF, &[])?;

        self.dbi.dcs_write(ILI9341_PWCTRLB, &[0x00, 0x83, 0x30])?;
        self.dbi.dcs_write(ILI9341_PWRSEQ, &[0x64, 0x03, 0x12, 0x81])?;
        self.dbi.dcs_write(ILI9341_DTCTRLA, &[0x85, 0x01, 0x79])?;
        self.dbi
            .dcs_write(ILI9341_PWCTRLA, &[0x39, 0x2c, 0x00, 0x34, 0x02])?;
        self.dbi.dcs_write(ILI9341_PUMPCTRL, &[0x20])?;
        self.dbi.dcs_write(ILI9341_DTCTRLB, &[0x00, 0x00])?;

        // Power control
        self.dbi.dcs_write(ILI9341_PWCTRL1, &[0x26])?;
        self.dbi.dcs_write(ILI9341_PWCTRL2, &[0x11])?;
        // VCOM
        self.dbi.dcs_write(ILI9341_VMCTRL1, &[0x35, 0x3e])?;
        self.dbi.dcs_write(ILI9341_VMCTRL2, &[0xbe])?;

        // Memory access control
        self.dbi.dcs_write(dcs::SET_PIXEL_FORMAT, &[0x55])?;
        let addr_mode = self.addr_mode();
        self.dbi.dcs_write(dcs::SET_ADDRESS_MODE, &[addr_mode])?;

        // Frame rate
        self.dbi.dcs_write(ILI9341_FRMCTR1, &[0x00, 0x1b])?;

        // Gamma
        self.dbi.dcs_write(ILI9341_EN3GAM, &[0x08])?;
        self.dbi.dcs_write(dcs::SET_GAMMA_CURVE, &[0x01])?;
        self.dbi.dcs_write(
            ILI9341_PGAMCTRL,
            &[
                0x1f, 0x1a, 0x18, 0x0a, 0x0f, 0x06, 0x45, 0x87, 0x32, 0x0a, 0x07, 0x02, 0x07,
                0x05, 0x00,
            ],
        )?;
        self.dbi.dcs_write(
            ILI9341_NGAMCTRL,
            &[
                0x00, 0x25, 0x27, 0x05, 0x10, 0x09, 0x3a, 0x78, 0x4d, 0x05, 0x18, 0x0d, 0x38,
                0x3a, 0x1f,
            ],
        )?;

        // DDRAM
        self.dbi.dcs_write(ILI9341_ETMOD, &[0x07])?;

        // Display
        self.dbi
            .dcs_write(ILI9341_DISCTRL, &[0x0a, 0x82, 0x27, 0x00])?;
        self.dbi.dcs_write(dcs::EXIT_SLEEP_MODE, &[])?;
        self.dbi.sleep_ms(100);

        self.dbi.dcs_write(dcs::SET_DISPLAY_ON, &[])?;
        self.dbi.sleep_ms(100);
        Ok(())
    }
}

impl<R, RST, BL, D, B> PanelOps<B> for Ili9341<R, RST, BL, D>
where
    R: RegisterBus,
    RST: OutputPin,
    BL: Backlight,
    D: DelayNs,
    B: BufferBacking,
{
    fn enable(&mut self, state: &mut DeviceState) -> Result<(), Error> {
        if state.prepared {
            return Ok(());
        }
        self.init()?;
        state.prepared = true;
        Ok(())
    }

    fn disable(&mut self, state: &mut DeviceState) -> Result<(), Error> {
        self.dbi.disable(state)
    }

    fn dirty(
        &mut self,
        state: &mut DeviceState,
        _fb: &Framebuffer,
        buffer: &mut BufferHandle<B>,
        _flags: u32,
        _color: u32,
        rect: ClipRect,
    ) -> Result<(), Error> {
        self.dbi.flush_rect(state, buffer, rect)
    }
}
