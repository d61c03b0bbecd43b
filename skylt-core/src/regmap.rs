//! Register map over an abstract bus
//!
//! Generalizes "write value(s) to register" over buses with different
//! capabilities. A bus may offer a combined write (register and payload in
//! one buffer), a gather write (register and payload as separate pieces,
//! letting zero-copy payloads stay zero-copy), a raw read, or any subset;
//! the map picks the best path the bus supports.

use crate::buffer::Source;
use crate::error::Error;

/// Byte order for multi-byte register or value encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endian {
    /// Bus default (resolves to big-endian)
    #[default]
    Default,
    Big,
    Little,
    Native,
}

impl Endian {
    fn resolve(self) -> Endian {
        match self {
            Endian::Default => Endian::Big,
            other => other,
        }
    }
}

/// What a [`RegisterBus`] implementation can do
#[derive(Debug, Clone, Copy)]
pub struct BusCaps {
    /// Combined register+payload write
    pub write: bool,
    /// Separate register/payload write, payload may be a shared buffer
    pub gather_write: bool,
    /// Raw register read
    pub read: bool,
    /// Largest raw read payload, 0 for unlimited
    pub max_raw_read: usize,
    /// Largest raw write payload, 0 for unlimited
    pub max_raw_write: usize,
    pub reg_endian: Endian,
    pub val_endian: Endian,
}

impl Default for BusCaps {
    fn default() -> Self {
        Self {
            write: false,
            gather_write: false,
            read: false,
            max_raw_read: 0,
            max_raw_write: 0,
            reg_endian: Endian::Default,
            val_endian: Endian::Default,
        }
    }
}

/// Register-oriented bus the map drives.
///
/// Default method bodies report the capability as absent; implementors
/// override exactly the operations their [`BusCaps`] advertise.
pub trait RegisterBus {
    fn caps(&self) -> BusCaps;

    /// Combined write: formatted register followed by payload
    fn write(&mut self, _data: &[u8]) -> Result<(), Error> {
        Err(Error::Capability)
    }

    /// Gather write: formatted register, then payload from `val`
    fn gather_write(&mut self, _reg: &[u8], _val: Source<'_>) -> Result<(), Error> {
        Err(Error::Capability)
    }

    /// Raw read: formatted register, payload into `dst`
    fn read(&mut self, _reg: &[u8], _dst: &mut [u8]) -> Result<(), Error> {
        Err(Error::Capability)
    }
}

/// Static register geometry
#[derive(Debug, Clone, Copy)]
pub struct RegmapConfig {
    pub reg_bits: u8,
    pub val_bits: u8,
    /// Dummy bits between register and payload, must be a whole byte count
    pub pad_bits: u8,
    /// Register address granularity
    pub reg_stride: u32,
    /// Bits the register address is shifted down before formatting
    pub reg_shift: u8,
    /// OR-ed into the formatted register on reads
    pub read_flag_mask: u8,
    /// OR-ed into the formatted register on writes
    pub write_flag_mask: u8,
    /// Device only tolerates single-value accesses
    pub use_single_rw: bool,
    /// Device accepts multi-register writes in one bus operation
    pub can_multi_write: bool,
}

impl Default for RegmapConfig {
    fn default() -> Self {
        Self {
            reg_bits: 8,
            val_bits: 8,
            pad_bits: 0,
            reg_stride: 1,
            reg_shift: 0,
            read_flag_mask: 0,
            write_flag_mask: 0,
            use_single_rw: false,
            can_multi_write: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Format {
    pad_bytes: usize,
    val_bytes: usize,
}

/// Upper bound on a linearized register+payload buffer
const LINEAR_MAX: usize = 256;

/// Register map bound to one bus
pub struct RegisterMap<R: RegisterBus> {
    bus: R,
    format: Format,
    config: RegmapConfig,
    caps: BusCaps,
    reg_endian: Endian,
    val_endian: Endian,
}

impl<R: RegisterBus> RegisterMap<R> {
    /// Bind a map to a bus.
    ///
    /// Only 8-bit registers with 8-bit values are supported; other
    /// geometries are rejected up front as a configuration error.
    pub fn new(bus: R, config: RegmapConfig) -> Result<Self, Error> {
        if config.reg_bits != 8 || config.val_bits != 8 {
            return Err(Error::Config);
        }
        if config.pad_bits % 8 != 0 {
            return Err(Error::Config);
        }
        if config.reg_stride == 0 {
            return Err(Error::Config);
        }
        let caps = bus.caps();
        Ok(Self {
            bus,
            format: Format {
                pad_bytes: (config.pad_bits / 8) as usize,
                val_bytes: 1,
            },
            config,
            caps,
            reg_endian: caps.reg_endian.resolve(),
            val_endian: caps.val_endian.resolve(),
        })
    }

    pub fn bus(&self) -> &R {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut R {
        &mut self.bus
    }

    /// Resolved register address byte order
    pub fn reg_endian(&self) -> Endian {
        self.reg_endian
    }

    /// Resolved value byte order
    pub fn val_endian(&self) -> Endian {
        self.val_endian
    }

    /// Whether reads must go one value at a time
    pub fn use_single_read(&self) -> bool {
        self.config.use_single_rw || !self.caps.read
    }

    /// Whether writes must go one value at a time
    pub fn use_single_write(&self) -> bool {
        self.config.use_single_rw || !self.caps.write
    }

    /// Whether one bus operation may cover several registers
    pub fn can_multi_write(&self) -> bool {
        self.config.can_multi_write && self.caps.write
    }

    fn format_reg(&self, reg: u32, flag: u8) -> u8 {
        ((reg >> self.config.reg_shift) as u8) | flag
    }

    /// Write a payload of whole values to `reg`.
    ///
    /// An empty payload is legal and writes the bare register, which is
    /// how parameterless commands go out on command/data buses.
    pub fn raw_write(&mut self, reg: u32, val: Source<'_>) -> Result<(), Error> {
        let len = val.len();
        if len % self.format.val_bytes != 0 {
            return Err(Error::InvalidArgument);
        }
        if reg % self.config.reg_stride != 0 {
            return Err(Error::Alignment);
        }
        if self.caps.max_raw_write != 0 && len > self.caps.max_raw_write {
            return Err(Error::Size);
        }

        let reg_byte = self.format_reg(reg, self.config.write_flag_mask);

        // Single values go out as one combined buffer when the bus can
        // take it; anything else prefers gather so shared payloads stay
        // zero-copy.
        if self.caps.write && len == self.format.val_bytes {
            if let Source::Bytes(bytes) = val {
                let mut buf = heapless::Vec::<u8, 8>::new();
                buf.push(reg_byte).map_err(|_| Error::Size)?;
                for _ in 0..self.format.pad_bytes {
                    buf.push(0).map_err(|_| Error::Size)?;
                }
                buf.extend_from_slice(bytes).map_err(|_| Error::Size)?;
                return self.bus.write(&buf);
            }
        }

        if self.caps.gather_write {
            let reg_buf = [reg_byte];
            return self.bus.gather_write(&reg_buf, val);
        }

        if self.caps.write {
            if let Source::Bytes(bytes) = val {
                let mut buf = heapless::Vec::<u8, LINEAR_MAX>::new();
                buf.push(reg_byte).map_err(|_| Error::Size)?;
                for _ in 0..self.format.pad_bytes {
                    buf.push(0).map_err(|_| Error::Size)?;
                }
                buf.extend_from_slice(bytes).map_err(|_| Error::Size)?;
                return self.bus.write(&buf);
            }
        }

        Err(Error::Capability)
    }

    /// Read a payload of whole values from `reg`
    pub fn raw_read(&mut self, reg: u32, dst: &mut [u8]) -> Result<(), Error> {
        if !self.caps.read {
            return Err(Error::Capability);
        }
        if dst.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if dst.len() % self.format.val_bytes != 0 {
            return Err(Error::Alignment);
        }
        if reg % self.config.reg_stride != 0 {
            return Err(Error::Alignment);
        }
        if self.caps.max_raw_read != 0 && dst.len() > self.caps.max_raw_read {
            return Err(Error::Size);
        }

        let reg_buf = [self.format_reg(reg, self.config.read_flag_mask)];
        self.bus.read(&reg_buf, dst)
    }

    /// Write one value
    pub fn write_register(&mut self, reg: u32, val: u32) -> Result<(), Error> {
        let byte = [val as u8];
        self.raw_write(reg, Source::Bytes(&byte))
    }

    /// Read one value
    pub fn read_register(&mut self, reg: u32) -> Result<u32, Error> {
        let mut byte = [0u8];
        self.raw_read(reg, &mut byte)?;
        Ok(byte[0] as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum BusCall {
        Write(heapless::Vec<u8, 64>),
        Gather {
            reg: u8,
            bytes: Option<heapless::Vec<u8, 64>>,
            shared_len: usize,
        },
        Read(u8),
    }

    struct MockBus {
        caps: BusCaps,
        calls: heapless::Vec<BusCall, 16>,
        read_data: heapless::Vec<u8, 16>,
    }

    impl MockBus {
        fn new(caps: BusCaps) -> Self {
            Self {
                caps,
                calls: heapless::Vec::new(),
                read_data: heapless::Vec::new(),
            }
        }
    }

    impl RegisterBus for MockBus {
        fn caps(&self) -> BusCaps {
            self.caps
        }

        fn write(&mut self, data: &[u8]) -> Result<(), Error> {
            self.calls
                .push(BusCall::Write(heapless::Vec::from_slice(data).unwrap()))
                .unwrap();
            Ok(())
        }

        fn gather_write(&mut self, reg: &[u8], val: Source<'_>) -> Result<(), Error> {
            let call = match val {
                Source::Bytes(b) => BusCall::Gather {
                    reg: reg[0],
                    bytes: Some(heapless::Vec::from_slice(b).unwrap()),
                    shared_len: 0,
                },
                Source::Shared { len, .. } => BusCall::Gather {
                    reg: reg[0],
                    bytes: None,
                    shared_len: len,
                },
            };
            self.calls.push(call).unwrap();
            Ok(())
        }

        fn read(&mut self, reg: &[u8], dst: &mut [u8]) -> Result<(), Error> {
            self.calls.push(BusCall::Read(reg[0])).unwrap();
            let n = dst.len().min(self.read_data.len());
            dst[..n].copy_from_slice(&self.read_data[..n]);
            Ok(())
        }
    }

    fn full_caps() -> BusCaps {
        BusCaps {
            write: true,
            gather_write: true,
            read: true,
            ..BusCaps::default()
        }
    }

    #[test]
    fn test_geometry_validation() {
        let bus = MockBus::new(full_caps());
        assert!(matches!(
            RegisterMap::new(
                bus,
                RegmapConfig {
                    reg_bits: 16,
                    ..RegmapConfig::default()
                }
            ),
            Err(Error::Config)
        ));
    }

    #[test]
    fn test_default_endian_resolves_big() {
        let bus = MockBus::new(full_caps());
        let map = RegisterMap::new(bus, RegmapConfig::default()).unwrap();
        assert_eq!(map.reg_endian(), Endian::Big);
        assert_eq!(map.val_endian(), Endian::Big);
    }

    #[test]
    fn test_single_value_uses_combined_write() {
        let bus = MockBus::new(full_caps());
        let mut map = RegisterMap::new(bus, RegmapConfig::default()).unwrap();
        map.write_register(0x36, 0xa8).unwrap();
        assert_eq!(
            map.bus().calls[0],
            BusCall::Write(heapless::Vec::from_slice(&[0x36, 0xa8]).unwrap())
        );
    }

    #[test]
    fn test_multi_value_uses_gather() {
        let bus = MockBus::new(full_caps());
        let mut map = RegisterMap::new(bus, RegmapConfig::default()).unwrap();
        map.raw_write(0x2a, Source::Bytes(&[0, 0, 1, 0x3f])).unwrap();
        assert_eq!(
            map.bus().calls[0],
            BusCall::Gather {
                reg: 0x2a,
                bytes: Some(heapless::Vec::from_slice(&[0, 0, 1, 0x3f]).unwrap()),
                shared_len: 0,
            }
        );
    }

    #[test]
    fn test_parameterless_command_write() {
        let bus = MockBus::new(full_caps());
        let mut map = RegisterMap::new(bus, RegmapConfig::default()).unwrap();
        map.raw_write(0x01, Source::Bytes(&[])).unwrap();
        assert_eq!(
            map.bus().calls[0],
            BusCall::Gather {
                reg: 0x01,
                bytes: Some(heapless::Vec::new()),
                shared_len: 0,
            }
        );
    }

    #[test]
    fn test_shared_payload_stays_gathered() {
        let bus = MockBus::new(full_caps());
        let mut map = RegisterMap::new(bus, RegmapConfig::default()).unwrap();
        map.raw_write(
            0x2c,
            Source::Shared {
                id: skylt_hal::BufferId(4),
                len: 1024,
            },
        )
        .unwrap();
        assert_eq!(
            map.bus().calls[0],
            BusCall::Gather {
                reg: 0x2c,
                bytes: None,
                shared_len: 1024,
            }
        );
    }

    #[test]
    fn test_write_only_combined_bus_linearizes() {
        let caps = BusCaps {
            write: true,
            ..BusCaps::default()
        };
        let bus = MockBus::new(caps);
        let mut map = RegisterMap::new(bus, RegmapConfig::default()).unwrap();
        map.raw_write(0x10, Source::Bytes(&[1, 2, 3])).unwrap();
        assert_eq!(
            map.bus().calls[0],
            BusCall::Write(heapless::Vec::from_slice(&[0x10, 1, 2, 3]).unwrap())
        );
    }

    #[test]
    fn test_no_write_capability() {
        let bus = MockBus::new(BusCaps::default());
        let mut map = RegisterMap::new(bus, RegmapConfig::default()).unwrap();
        assert_eq!(map.write_register(0, 0), Err(Error::Capability));
    }

    #[test]
    fn test_derived_access_flags() {
        let full = RegisterMap::new(MockBus::new(full_caps()), RegmapConfig::default()).unwrap();
        assert!(!full.use_single_read());
        assert!(!full.use_single_write());
        assert!(!full.can_multi_write());

        let write_only = RegisterMap::new(
            MockBus::new(BusCaps {
                write: true,
                ..BusCaps::default()
            }),
            RegmapConfig {
                can_multi_write: true,
                ..RegmapConfig::default()
            },
        )
        .unwrap();
        // No read path forces single reads; multi-write needs the bus too
        assert!(write_only.use_single_read());
        assert!(!write_only.use_single_write());
        assert!(write_only.can_multi_write());

        let forced = RegisterMap::new(
            MockBus::new(full_caps()),
            RegmapConfig {
                use_single_rw: true,
                ..RegmapConfig::default()
            },
        )
        .unwrap();
        assert!(forced.use_single_read());
        assert!(forced.use_single_write());
    }

    #[test]
    fn test_read_path_and_flags() {
        let mut bus = MockBus::new(BusCaps {
            read: true,
            ..BusCaps::default()
        });
        bus.read_data.extend_from_slice(&[0x9c]).unwrap();
        let mut map = RegisterMap::new(
            bus,
            RegmapConfig {
                read_flag_mask: 0x80,
                ..RegmapConfig::default()
            },
        )
        .unwrap();
        assert_eq!(map.read_register(0x0a).unwrap(), 0x9c);
        assert_eq!(map.bus().calls[0], BusCall::Read(0x8a));
    }

    #[test]
    fn test_read_limits() {
        let bus = MockBus::new(BusCaps {
            read: true,
            max_raw_read: 2,
            ..BusCaps::default()
        });
        let mut map = RegisterMap::new(bus, RegmapConfig::default()).unwrap();
        let mut big = [0u8; 4];
        assert_eq!(map.raw_read(0, &mut big), Err(Error::Size));
        let mut none: [u8; 0] = [];
        assert_eq!(map.raw_read(0, &mut none), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_stride_alignment() {
        let bus = MockBus::new(full_caps());
        let mut map = RegisterMap::new(
            bus,
            RegmapConfig {
                reg_stride: 2,
                ..RegmapConfig::default()
            },
        )
        .unwrap();
        assert_eq!(map.write_register(3, 0), Err(Error::Alignment));
    }
}
