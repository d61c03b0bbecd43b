//! Skylt Hardware Abstraction Layer
//!
//! This crate defines the capability traits the core driver stack is built
//! on. Implementations live outside the workspace (an actual Linux backend
//! would open character devices and issue ioctls); tests use in-memory
//! fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Panel drivers (skylt-panels)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  skylt-core (regmap/transport/device)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  skylt-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`link::ControlLink`] - segmented wire transport requests
//! - [`channel::EventChannel`] - device lifecycle event channel
//! - [`buffer::BufferBacking`] - shared pixel-buffer resource
//! - [`gpio::OutputPin`] - control pins (D/C, reset)
//! - [`backlight::Backlight`] - panel backlight power
//! - [`properties::PropertyStore`] - device-tree style properties

#![no_std]
#![deny(unsafe_code)]

pub mod backlight;
pub mod buffer;
pub mod channel;
pub mod gpio;
pub mod link;
pub mod properties;

// Re-export key traits at crate root for convenience
pub use backlight::{Backlight, BacklightError};
pub use buffer::{BufferBacking, BufferError, MapToken, SyncDirection, SyncPhase};
pub use channel::{ChannelError, EventChannel};
pub use gpio::OutputPin;
pub use link::{word_mask, BufferId, ControlLink, HeaderSegment, LinkError, Segment, SegmentData};
pub use properties::{PropertyError, PropertyStore};
