//! Skylt wire protocol
//!
//! Defines the event records the display controller writes to the driver
//! and the status words the driver writes back. All multi-byte fields are
//! little-endian; each read yields exactly one whole record.
//!
//! # Record layout
//!
//! ```text
//! ┌─────────┬──────────────────────────────┐
//! │ tag u32 │ tag-specific payload          │
//! └─────────┴──────────────────────────────┘
//! ```
//!
//! Responses are a single `i32` status, `0` for success or a negative
//! errno-style code (see [`status`]).

#![no_std]
#![deny(unsafe_code)]

pub mod event;
pub mod status;

pub use event::{ClipRect, DecodeError, DeviceEvent, MAX_CLIP_RECTS, MAX_EVENT_SIZE};
pub use status::Status;
