//! Error taxonomy for the core driver stack
//!
//! One flat enum covers every fallible core operation; each variant maps to
//! exactly one wire status so event handlers can answer the controller
//! without per-call translation tables.

use skylt_hal::{BufferError, ChannelError, LinkError};
use skylt_protocol::Status;

/// Core driver error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Static configuration rejected (unsupported register/value geometry)
    Config,
    /// Hardware or backend lacks a required capability
    Capability,
    /// Operation forbidden on this device (e.g. read on write-only bus)
    AccessDenied,
    /// Offset or length violates an alignment rule
    Alignment,
    /// Request exceeds a size limit
    Size,
    /// Referenced object does not exist
    NotFound,
    /// Malformed or out-of-range argument
    InvalidArgument,
    /// Backend resource failure (I/O, exhaustion, hangup)
    Resource,
    /// Operation recognized but not implemented
    NotImplemented,
}

impl Error {
    /// Wire status answering an event that failed with this error
    pub fn status(&self) -> Status {
        match self {
            Error::Config | Error::Alignment | Error::InvalidArgument => Status::INVALID,
            Error::Capability => Status::UNSUPPORTED,
            Error::AccessDenied => Status::ACCESS_DENIED,
            Error::Size => Status::TOO_BIG,
            Error::NotFound => Status::NOT_FOUND,
            Error::Resource => Status::IO,
            Error::NotImplemented => Status::NOT_IMPLEMENTED,
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        match e {
            LinkError::Io => Error::Resource,
            LinkError::Unsupported => Error::Capability,
            LinkError::TooLong => Error::Size,
        }
    }
}

impl From<ChannelError> for Error {
    fn from(_: ChannelError) -> Self {
        Error::Resource
    }
}

impl From<BufferError> for Error {
    fn from(_: BufferError) -> Self {
        Error::Resource
    }
}
