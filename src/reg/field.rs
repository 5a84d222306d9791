//! A named bit range inside a register together with its access attribute.

use std::fmt;

use super::access::AccessKind;
use super::RegData;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    name: String,
    lsb: u32,
    size: u32,
    reset_value: RegData,
    access: AccessKind,
}

impl Field {
    /// Creates a detached field. Its position is assigned when it is added to a register.
    pub fn new(
        name: impl Into<String>,
        reset_value: RegData,
        size: u32,
        access: AccessKind,
    ) -> Self {
        Self {
            name: name.into(),
            lsb: 0,
            size,
            reset_value,
            access,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lsb(&self) -> u32 {
        self.lsb
    }

    pub fn msb(&self) -> u32 {
        self.lsb + self.size.saturating_sub(1)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Reset value as declared; bits above `size` are ignored when the register reset is computed.
    pub fn reset_value(&self) -> RegData {
        self.reset_value
    }

    pub fn access(&self) -> AccessKind {
        self.access
    }

    pub(crate) fn place(&mut self, lsb: u32) {
        self.lsb = lsb;
    }

    /// Unshifted mask covering `size` bits.
    #[inline(always)]
    pub fn mask(&self) -> RegData {
        if self.size >= RegData::BITS {
            RegData::MAX
        } else {
            (1 << self.size) - 1
        }
    }

    /// Mask of the field's bits in register coordinates.
    #[inline(always)]
    pub fn register_mask(&self) -> RegData {
        self.mask() << self.lsb
    }

    #[inline(always)]
    pub fn extract(&self, register_value: RegData) -> RegData {
        (register_value >> self.lsb) & self.mask()
    }

    #[inline(always)]
    pub fn insert(&self, register_value: RegData, field_value: RegData) -> RegData {
        let cleared = register_value & !self.register_mask();
        cleared | ((field_value & self.mask()) << self.lsb)
    }

    /// Reset contribution of this field in register coordinates.
    pub fn reset_bits(&self) -> RegData {
        (self.reset_value & self.mask()) << self.lsb
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lsb={} size={} access={} W={} R={} reset=0x{:X}",
            self.name,
            self.lsb,
            self.size,
            self.access,
            self.access.is_writable(),
            self.access.is_readable(),
            self.reset_value
        )
    }
}
