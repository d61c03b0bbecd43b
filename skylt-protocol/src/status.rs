//! Event response status words
//!
//! Every event is answered with one signed 32-bit status. Zero means
//! success; failures use negative errno-style codes so the controller can
//! surface them unchanged.

/// Signed status word written back after each event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub i32);

impl Status {
    /// Event handled successfully
    pub const OK: Status = Status(0);
    /// Referenced object does not exist (`-ENOENT`)
    pub const NOT_FOUND: Status = Status(-2);
    /// Backend I/O failure (`-EIO`)
    pub const IO: Status = Status(-5);
    /// Request exceeds a size limit (`-E2BIG`)
    pub const TOO_BIG: Status = Status(-7);
    /// Operation not permitted on this device (`-EACCES`)
    pub const ACCESS_DENIED: Status = Status(-13);
    /// Malformed or out-of-range argument (`-EINVAL`)
    pub const INVALID: Status = Status(-22);
    /// Event tag not understood by this driver (`-ENOSYS`)
    pub const NOT_IMPLEMENTED: Status = Status(-38);
    /// Feature not supported by the hardware (`-EOPNOTSUPP`)
    pub const UNSUPPORTED: Status = Status(-95);

    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }

    /// Little-endian wire form
    pub fn to_le_bytes(&self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}
