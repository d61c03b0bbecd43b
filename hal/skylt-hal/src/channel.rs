//! Lifecycle control channel
//!
//! The display controller pushes lifecycle and paint events through a
//! per-device channel; the driver answers each event with a 4-byte signed
//! status before reading the next one (strict request/response order).

/// Errors reported by the event channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// Read or write failed in the backend
    Io,
    /// Channel hung up or was invalidated from outside
    Closed,
    /// Announce string exceeds the channel's name limit
    TooLong,
}

/// Bidirectional event/response channel to the display controller
pub trait EventChannel {
    /// Announce the driver to the controller.
    ///
    /// Must be the first write on the channel. The announce string is
    /// `name`, or `name\ncompatible` when a compatible string is given.
    fn announce(&mut self, name: &str, compatible: Option<&str>) -> Result<(), ChannelError>;

    /// Read the next event record into `buf`, returning the record length
    fn read_event(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError>;

    /// Write the status for the event just dispatched
    fn write_status(&mut self, status: i32) -> Result<(), ChannelError>;

    /// Block until the next event is ready.
    ///
    /// Returns `Err(ChannelError::Closed)` when the channel has been hung
    /// up or invalidated; this is the only way to stop the event loop.
    fn wait_ready(&mut self) -> Result<(), ChannelError>;
}
