//! MIPI DCS command set (the subset panels here use)

pub const SOFT_RESET: u8 = 0x01;
pub const GET_DISPLAY_ID: u8 = 0x04;
pub const GET_DISPLAY_STATUS: u8 = 0x09;
pub const GET_POWER_MODE: u8 = 0x0a;
pub const EXIT_SLEEP_MODE: u8 = 0x11;
pub const SET_GAMMA_CURVE: u8 = 0x26;
pub const SET_DISPLAY_OFF: u8 = 0x28;
pub const SET_DISPLAY_ON: u8 = 0x29;
pub const SET_COLUMN_ADDRESS: u8 = 0x2a;
pub const SET_PAGE_ADDRESS: u8 = 0x2b;
pub const WRITE_MEMORY_START: u8 = 0x2c;
pub const SET_ADDRESS_MODE: u8 = 0x36;
pub const SET_PIXEL_FORMAT: u8 = 0x3a;

/// GET_POWER_MODE response bits
pub mod power_mode {
    pub const DISPLAY_ON: u8 = 1 << 2;
    pub const NORMAL_MODE: u8 = 1 << 3;
    pub const SLEEP_OUT: u8 = 1 << 4;
    pub const PARTIAL_MODE: u8 = 1 << 5;
    pub const IDLE_MODE: u8 = 1 << 6;
    /// Bits with undefined readback on common controllers
    pub const RESERVED_MASK: u8 = (1 << 0) | (1 << 1) | (1 << 7);
}
