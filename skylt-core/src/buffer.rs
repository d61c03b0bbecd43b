//! Shared pixel-buffer handle
//!
//! Wraps a [`BufferBacking`] with the lifetime discipline the rest of the
//! stack relies on: a liveness signature, an idempotent CPU mapping, and
//! sync brackets around every CPU read of pixel data.

use skylt_hal::{BufferBacking, BufferId, MapToken, SyncDirection, SyncPhase};

use crate::error::Error;
use crate::trace::{TraceSink, Tracer, TRACE_CORE};

/// Signature of a live handle
pub const HANDLE_MAGIC: u32 = 0xB00F_B00F;
/// Signature left behind after release, to make stale use visible
pub const HANDLE_DEAD: u32 = 0xDEAD_BEEF;

/// Where the bytes of a transfer come from
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// In-memory slice, copied through link request buffers
    Bytes(&'a [u8]),
    /// Shared buffer referenced by id, moved zero-copy by the link
    Shared { id: BufferId, len: usize },
}

impl Source<'_> {
    pub fn len(&self) -> usize {
        match self {
            Source::Bytes(b) => b.len(),
            Source::Shared { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owned handle over a shared buffer backing
pub struct BufferHandle<B: BufferBacking> {
    backing: B,
    size: usize,
    mapping: Option<MapToken>,
    signature: u32,
}

impl<B: BufferBacking> BufferHandle<B> {
    /// Take ownership of a backing resource
    pub fn acquire(backing: B) -> Self {
        let size = backing.size();
        Self {
            backing,
            size,
            mapping: None,
            signature: HANDLE_MAGIC,
        }
    }

    pub fn id(&self) -> BufferId {
        self.backing.id()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the handle still carries the live signature
    pub fn is_valid(&self) -> bool {
        self.signature == HANDLE_MAGIC
    }

    /// Establish (or reuse) the CPU mapping
    pub fn map(&mut self) -> Result<MapToken, Error> {
        if let Some(token) = self.mapping {
            return Ok(token);
        }
        let token = self.backing.map()?;
        self.mapping = Some(token);
        Ok(token)
    }

    /// Tear the mapping down.
    ///
    /// A token that does not match the active mapping is logged and
    /// ignored; the mapping stays up.
    pub fn unmap<S: TraceSink>(&mut self, token: MapToken, trace: &mut Tracer<S>) {
        match self.mapping {
            Some(active) if active == token => {
                if self.backing.unmap(token).is_err() {
                    trace.line(TRACE_CORE, format_args!("unmap failed, dropping mapping"));
                }
                self.mapping = None;
            }
            _ => {
                trace.line(
                    TRACE_CORE,
                    format_args!("unmap token mismatch, mapping kept"),
                );
            }
        }
    }

    /// Start a CPU access bracket before reading pixel data
    pub fn begin_access(&mut self) -> Result<(), Error> {
        self.backing.sync(SyncPhase::Start, SyncDirection::Write)?;
        Ok(())
    }

    /// End the CPU access bracket
    pub fn end_access(&mut self) -> Result<(), Error> {
        self.backing.sync(SyncPhase::End, SyncDirection::Write)?;
        Ok(())
    }

    /// Copy mapped bytes at `offset` into `dst`, mapping on demand
    pub fn copy_from_mapped(&mut self, offset: usize, dst: &mut [u8]) -> Result<(), Error> {
        if offset + dst.len() > self.size {
            return Err(Error::Size);
        }
        let token = self.map()?;
        self.backing.read_mapped(token, offset, dst)?;
        Ok(())
    }

    /// Transfer source referencing the first `len` bytes of this buffer
    pub fn source(&self, len: usize) -> Source<'_> {
        Source::Shared {
            id: self.backing.id(),
            len,
        }
    }

    /// Release the backing and mark the handle dead
    pub fn release<S: TraceSink>(&mut self, trace: &mut Tracer<S>) -> Result<(), Error> {
        if let Some(token) = self.mapping {
            self.unmap(token, trace);
        }
        self.signature = HANDLE_DEAD;
        self.backing.release()?;
        Ok(())
    }
}
