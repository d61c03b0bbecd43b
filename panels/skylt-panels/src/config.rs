//! Panel configuration
//!
//! Drivers start from compile-time defaults for their module and overlay
//! whatever the device's property store provides, so one binary covers
//! boards that wire the same panel differently.

use skylt_core::error::Error;
use skylt_hal::PropertyStore;

/// Resolved panel parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    pub name: &'static str,
    pub compatible: Option<&'static str>,
    pub width: u32,
    pub height: u32,
    /// Counter-clockwise, one of 0/90/180/270
    pub rotation: u16,
    pub bpp: u32,
    /// Parallel data width; only 8-bit serial-style wiring is handled
    pub buswidth: u32,
    pub regwidth: u32,
    pub write_only: bool,
    pub enable_delay_ms: u32,
    pub backlight: bool,
    /// Wire clock ceiling, applied by the link backend when it opens the
    /// bus; driver code sees it again as `ControlLink::default_speed_hz`
    pub max_speed_hz: u32,
    /// Refresh rate advertised in the display mode the host sets up
    pub fps: u32,
}

impl PanelConfig {
    pub fn new(name: &'static str, width: u32, height: u32) -> Self {
        Self {
            name,
            compatible: None,
            width,
            height,
            rotation: 0,
            bpp: 16,
            buswidth: 8,
            regwidth: 8,
            write_only: false,
            enable_delay_ms: 50,
            backlight: false,
            max_speed_hz: 32_000_000,
            fps: 20,
        }
    }

    /// Defaults for MI0283QT modules
    pub fn mi0283qt() -> Self {
        Self {
            compatible: Some("multi-inno,mi0283qt"),
            ..Self::new("mi0283qt", 320, 240)
        }
    }

    /// Overlay values from the device's property store.
    ///
    /// Absent properties leave the defaults alone; a zero value counts as
    /// absent for the numeric overrides.
    pub fn apply_properties<P: PropertyStore>(&mut self, props: &P) -> Result<(), Error> {
        fn overlay<P: PropertyStore>(props: &P, name: &str, slot: &mut u32) {
            if let Ok(v) = props.read_u32(name) {
                if v != 0 {
                    *slot = v;
                }
            }
        }

        overlay(props, "width", &mut self.width);
        overlay(props, "height", &mut self.height);
        overlay(props, "bpp", &mut self.bpp);
        overlay(props, "buswidth", &mut self.buswidth);
        overlay(props, "regwidth", &mut self.regwidth);
        overlay(props, "spi-max-frequency", &mut self.max_speed_hz);
        overlay(props, "fps", &mut self.fps);

        if let Ok(r) = props.read_u32("rotation") {
            self.rotation = (r % 360) as u16;
        }
        if props.has_property("write-only") {
            self.write_only = true;
        }
        if props.has_property("led-gpios") || props.has_property("backlight") {
            self.backlight = true;
        }

        self.validate()
    }

    fn validate(&self) -> Result<(), Error> {
        if self.buswidth != 8 || self.regwidth != 8 {
            return Err(Error::Config);
        }
        if self.bpp != 16 {
            return Err(Error::Config);
        }
        match self.rotation {
            0 | 90 | 180 | 270 => Ok(()),
            _ => Err(Error::Config),
        }
    }

    /// Mode size after rotation; 90/270 swap the axes
    pub fn resolved_size(&self) -> (u32, u32) {
        match self.rotation {
            90 | 270 => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }
}
