//! Device-tree style property store
//!
//! Panel configuration arrives as named byte blobs (on Linux, the device
//! tree node of the SPI slave). Multi-cell numeric values are stored
//! big-endian regardless of host order.

/// Errors reported by a property lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyError {
    /// No property with that name
    NotFound,
    /// Property exists but its payload is shorter than requested
    NoData,
    /// Destination slice too small for the stored value
    Overflow,
}

/// Read-only store of named configuration properties
pub trait PropertyStore {
    /// Raw payload of the named property
    fn read_property(&self, name: &str) -> Result<&[u8], PropertyError>;

    /// Whether the named property exists (payload may be empty)
    fn has_property(&self, name: &str) -> bool {
        self.read_property(name).is_ok()
    }

    /// Single big-endian u32 cell
    fn read_u32(&self, name: &str) -> Result<u32, PropertyError> {
        let raw = self.read_property(name)?;
        if raw.len() < 4 {
            return Err(PropertyError::NoData);
        }
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// Array of big-endian u32 cells, returning the number of cells read
    fn read_u32_array(&self, name: &str, out: &mut [u32]) -> Result<usize, PropertyError> {
        let raw = self.read_property(name)?;
        let cells = raw.len() / 4;
        if cells > out.len() {
            return Err(PropertyError::Overflow);
        }
        for (i, slot) in out.iter_mut().take(cells).enumerate() {
            let off = i * 4;
            *slot = u32::from_be_bytes([raw[off], raw[off + 1], raw[off + 2], raw[off + 3]]);
        }
        Ok(cells)
    }
}
