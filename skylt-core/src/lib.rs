//! Skylt core driver stack
//!
//! Device-independent machinery between the controller's event channel
//! and a panel driver:
//!
//! - [`regmap`] - register maps over capability-described buses
//! - [`transport`] - chunked streaming over a fixed-capacity wire link
//! - [`buffer`] - shared pixel-buffer handles with mapping discipline
//! - [`registry`] - live framebuffer tracking
//! - [`device`] - the read/dispatch/answer event loop
//! - [`trace`] - category-masked diagnostics
//!
//! Everything is generic over the traits in `skylt-hal`; nothing here
//! touches an operating system directly.

#![no_std]
#![deny(unsafe_code)]

pub mod buffer;
pub mod device;
pub mod error;
pub mod format;
pub mod regmap;
pub mod registry;
pub mod trace;
pub mod transport;

pub use buffer::{BufferHandle, Source, HANDLE_DEAD, HANDLE_MAGIC};
pub use device::{DeviceEventLoop, DeviceState, LoopState, PanelOps};
pub use error::Error;
pub use format::PixelFormat;
pub use regmap::{BusCaps, Endian, RegisterBus, RegisterMap, RegmapConfig};
pub use registry::{
    Framebuffer, FramebufferInfo, FramebufferRegistry, GeometrySource, MAX_FRAMEBUFFERS,
};
pub use trace::{NullSink, TraceSink, Tracer, TRACE_CORE, TRACE_DRIVER, TRACE_KMS, TRACE_NONE};
pub use transport::TransportChannel;
