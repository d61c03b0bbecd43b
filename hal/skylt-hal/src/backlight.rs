//! Panel backlight power control

/// Errors reported by a backlight device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BacklightError {
    /// Power update failed in the backend
    Io,
}

/// Backlight power switch.
///
/// Brightness levels are the backend's business; the driver stack only
/// switches power, and only after the first frame has been flushed.
pub trait Backlight {
    fn set_power(&mut self, on: bool) -> Result<(), BacklightError>;
}
