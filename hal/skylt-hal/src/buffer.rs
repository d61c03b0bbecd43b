//! Shared pixel-buffer backing resource
//!
//! The display controller allocates one shared buffer per device (a dma-buf
//! on Linux). The backing trait exposes the small set of operations the
//! core [`BufferHandle`] wrapper needs: mapping a read-only CPU view,
//! bracketing CPU access for DMA coherence, and final release.
//!
//! [`BufferHandle`]: ../../skylt_core/buffer/struct.BufferHandle.html

use crate::link::BufferId;

/// Token for an established CPU mapping.
///
/// Stands in for the mapping's base address; tearing a mapping down
/// requires presenting the token that was returned when it was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MapToken(pub usize);

/// Which edge of a CPU-access bracket a sync request marks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPhase {
    Start,
    End,
}

/// Direction of the CPU access being bracketed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncDirection {
    Read,
    Write,
}

/// Errors reported by a buffer backing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// Mapping failed, typically address-space or descriptor exhaustion
    Exhausted,
    /// Control request to the backing resource failed
    Io,
    /// Operation requires an active mapping
    NotMapped,
    /// Offset/length outside the buffer
    OutOfRange,
}

/// Backing resource for a shared, lifetime-managed buffer
pub trait BufferBacking {
    /// Identity used for zero-copy wire segments
    fn id(&self) -> BufferId;

    /// Total size of the buffer in bytes
    fn size(&self) -> usize;

    /// Establish a read-only CPU view of the whole buffer.
    ///
    /// Fails without side effects on resource exhaustion.
    fn map(&mut self) -> Result<MapToken, BufferError>;

    /// Tear down the view previously returned by [`map`](Self::map)
    fn unmap(&mut self, token: MapToken) -> Result<(), BufferError>;

    /// Issue one sync control request bracketing CPU access
    fn sync(&mut self, phase: SyncPhase, direction: SyncDirection) -> Result<(), BufferError>;

    /// Copy mapped bytes at `offset` into `dst`
    fn read_mapped(
        &self,
        token: MapToken,
        offset: usize,
        dst: &mut [u8],
    ) -> Result<(), BufferError>;

    /// Free the backing resource. Called exactly once, at device teardown.
    fn release(&mut self) -> Result<(), BufferError>;
}
