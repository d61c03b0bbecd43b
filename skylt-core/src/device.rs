//! Device event loop
//!
//! Drives one panel from the controller's event channel: read an event,
//! dispatch it, answer with a status, wait for the next. Malformed or
//! unknown events are answered and survived; only channel failure stops
//! the loop.

use skylt_hal::{BufferBacking, ChannelError, EventChannel};
use skylt_protocol::{ClipRect, DecodeError, DeviceEvent, Status, MAX_EVENT_SIZE};

use crate::buffer::BufferHandle;
use crate::error::Error;
use crate::registry::{Framebuffer, FramebufferRegistry, GeometrySource};
use crate::trace::{TraceSink, Tracer, TRACE_KMS};

/// Pipeline state shared with the panel driver.
///
/// The panel's own callbacks flip these flags; the loop only reads them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    /// Controller initialization has run
    pub prepared: bool,
    /// Panel is lit and scanned out
    pub enabled: bool,
}

/// Panel driver callbacks
pub trait PanelOps<B: BufferBacking> {
    /// Pipeline switched on
    fn enable(&mut self, state: &mut DeviceState) -> Result<(), Error>;

    /// Pipeline switched off
    fn disable(&mut self, state: &mut DeviceState) -> Result<(), Error>;

    /// Flush one damage rectangle of `fb` out of the shared buffer
    fn dirty(
        &mut self,
        state: &mut DeviceState,
        fb: &Framebuffer,
        buffer: &mut BufferHandle<B>,
        flags: u32,
        color: u32,
        rect: ClipRect,
    ) -> Result<(), Error>;
}

/// Where the loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopState {
    /// Between events
    Idle,
    /// An event is being handled
    Dispatching,
    /// Status written, blocking for the next event
    WaitingForReadiness,
    /// Channel hung up or failed, loop is over
    Closed,
}

/// Event loop binding a channel, a registry and one shared buffer
pub struct DeviceEventLoop<C: EventChannel, B: BufferBacking, S: TraceSink> {
    channel: C,
    registry: FramebufferRegistry,
    state: DeviceState,
    buffer: Option<BufferHandle<B>>,
    tracer: Tracer<S>,
    loop_state: LoopState,
    event_buf: [u8; MAX_EVENT_SIZE],
}

impl<C: EventChannel, B: BufferBacking, S: TraceSink> DeviceEventLoop<C, B, S> {
    pub fn new(channel: C, tracer: Tracer<S>) -> Self {
        Self {
            channel,
            registry: FramebufferRegistry::new(),
            state: DeviceState::default(),
            buffer: None,
            tracer,
            loop_state: LoopState::Idle,
            event_buf: [0; MAX_EVENT_SIZE],
        }
    }

    /// Attach the shared pixel buffer dirty flushes read from
    pub fn set_buffer(&mut self, buffer: BufferHandle<B>) {
        self.buffer = Some(buffer);
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Announce the driver to the controller; first write on the channel
    pub fn register(&mut self, name: &str, compatible: Option<&str>) -> Result<(), Error> {
        self.channel.announce(name, compatible)?;
        Ok(())
    }

    /// Handle one event. `Ok(true)` to keep going, `Ok(false)` when the
    /// channel closed cleanly.
    pub fn step<P, G>(&mut self, panel: &mut P, geometry: &mut G) -> Result<bool, Error>
    where
        P: PanelOps<B>,
        G: GeometrySource,
    {
        self.loop_state = LoopState::Idle;
        let n = match self.channel.read_event(&mut self.event_buf) {
            Ok(n) => n,
            Err(ChannelError::Closed) => {
                self.loop_state = LoopState::Closed;
                return Ok(false);
            }
            Err(e) => {
                self.loop_state = LoopState::Closed;
                return Err(e.into());
            }
        };

        self.loop_state = LoopState::Dispatching;
        let status = match DeviceEvent::decode(&self.event_buf[..n]) {
            Ok(event) => self.dispatch(event, panel, geometry),
            Err(DecodeError::UnknownTag(tag)) => {
                self.tracer
                    .line(TRACE_KMS, format_args!("unknown event tag {}", tag));
                Status::NOT_IMPLEMENTED
            }
            Err(_) => Status::INVALID,
        };

        if let Err(e) = self.channel.write_status(status.0) {
            self.loop_state = LoopState::Closed;
            return Err(e.into());
        }

        self.loop_state = LoopState::WaitingForReadiness;
        match self.channel.wait_ready() {
            Ok(()) => Ok(true),
            Err(ChannelError::Closed) => {
                self.loop_state = LoopState::Closed;
                Ok(false)
            }
            Err(e) => {
                self.loop_state = LoopState::Closed;
                Err(e.into())
            }
        }
    }

    /// Run until the channel closes
    pub fn run<P, G>(&mut self, panel: &mut P, geometry: &mut G) -> Result<(), Error>
    where
        P: PanelOps<B>,
        G: GeometrySource,
    {
        while self.step(panel, geometry)? {}
        Ok(())
    }

    fn dispatch<P, G>(&mut self, event: DeviceEvent, panel: &mut P, geometry: &mut G) -> Status
    where
        P: PanelOps<B>,
        G: GeometrySource,
    {
        let result = match event {
            DeviceEvent::Enable => panel.enable(&mut self.state),
            DeviceEvent::Disable => panel.disable(&mut self.state),
            DeviceEvent::FbCreate { id } => {
                self.registry.create(geometry, id, &mut self.tracer)
            }
            DeviceEvent::FbDestroy { id } => self.registry.destroy(id),
            DeviceEvent::FbDirty {
                id,
                flags,
                color,
                rects,
            } => self.dirty(panel, id, flags, color, &rects),
        };
        match result {
            Ok(()) => Status::OK,
            Err(e) => {
                self.tracer
                    .line(TRACE_KMS, format_args!("event failed: {:?}", e));
                e.status()
            }
        }
    }

    fn dirty<P: PanelOps<B>>(
        &mut self,
        panel: &mut P,
        id: u32,
        flags: u32,
        color: u32,
        rects: &[ClipRect],
    ) -> Result<(), Error> {
        let fb = *self.registry.find(id).ok_or(Error::NotFound)?;
        // The controller coalesces damage into exactly one rectangle
        let rect = match rects {
            [one] => *one,
            _ => return Err(Error::InvalidArgument),
        };
        let buffer = self.buffer.as_mut().ok_or(Error::InvalidArgument)?;
        panel.dirty(&mut self.state, &fb, buffer, flags, color, rect)
    }

    /// Release the shared buffer and close out the loop
    pub fn shutdown(&mut self) -> Result<(), Error> {
        self.loop_state = LoopState::Closed;
        if let Some(mut buffer) = self.buffer.take() {
            buffer.release(&mut self.tracer)?;
        }
        Ok(())
    }
}
