//! Access attributes, directions and status codes shared by fields, registers and maps.
//!
//! Every behaviour a field exhibits at access time is derived from its `AccessKind` through the
//! predicate table below. Registers never match on the kind themselves; they only consult the
//! predicates, so a new attribute is a new table row.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use super::error::LayoutError;

/// Closed set of field access attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum AccessKind {
    /// W: no effect, R: no effect.
    ReadOnly,
    /// W: as-is, R: no effect.
    ReadWrite,
    /// W: no effect, R: clears all bits.
    ReadClear,
    /// W: as-is, R: error.
    WriteOnly,
    /// W: no effect, R: sets all bits.
    ReadSet,
    /// W: as-is, R: clears all bits.
    WriteReadClear,
    /// W: as-is, R: sets all bits.
    WriteReadSet,
    /// W: clears all bits, R: no effect.
    WriteClear,
    /// W: sets all bits, R: no effect.
    WriteSet,
    /// W: sets all bits, R: clears all bits.
    WriteSetReadClear,
    /// W: clears all bits, R: sets all bits.
    WriteClearReadSet,
    /// W: a 1 clears the matching bit, a 0 leaves it alone. R: no effect.
    WriteOneClear,
}

impl AccessKind {
    pub const ALL: [AccessKind; 12] = [
        AccessKind::ReadOnly,
        AccessKind::ReadWrite,
        AccessKind::ReadClear,
        AccessKind::WriteOnly,
        AccessKind::ReadSet,
        AccessKind::WriteReadClear,
        AccessKind::WriteReadSet,
        AccessKind::WriteClear,
        AccessKind::WriteSet,
        AccessKind::WriteSetReadClear,
        AccessKind::WriteClearReadSet,
        AccessKind::WriteOneClear,
    ];

    /// Canonical register-description mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            AccessKind::ReadOnly => "RO",
            AccessKind::ReadWrite => "RW",
            AccessKind::ReadClear => "RC",
            AccessKind::WriteOnly => "WO",
            AccessKind::ReadSet => "RS",
            AccessKind::WriteReadClear => "WRC",
            AccessKind::WriteReadSet => "WRS",
            AccessKind::WriteClear => "WC",
            AccessKind::WriteSet => "WS",
            AccessKind::WriteSetReadClear => "WSRC",
            AccessKind::WriteClearReadSet => "WCRS",
            AccessKind::WriteOneClear => "W1C",
        }
    }

    pub const fn is_writable(self) -> bool {
        matches!(
            self,
            AccessKind::ReadWrite
                | AccessKind::WriteOnly
                | AccessKind::WriteReadClear
                | AccessKind::WriteReadSet
                | AccessKind::WriteOneClear
        )
    }

    pub const fn is_readable(self) -> bool {
        !matches!(self, AccessKind::WriteOnly)
    }

    pub const fn is_error_on_read(self) -> bool {
        matches!(self, AccessKind::WriteOnly)
    }

    pub const fn is_error_on_write(self) -> bool {
        false
    }

    pub const fn is_clear_on_read(self) -> bool {
        matches!(
            self,
            AccessKind::ReadClear | AccessKind::WriteReadClear | AccessKind::WriteSetReadClear
        )
    }

    pub const fn is_clear_on_write(self) -> bool {
        matches!(self, AccessKind::WriteClear | AccessKind::WriteClearReadSet)
    }

    pub const fn is_set_on_read(self) -> bool {
        matches!(
            self,
            AccessKind::ReadSet | AccessKind::WriteReadSet | AccessKind::WriteClearReadSet
        )
    }

    pub const fn is_set_on_write(self) -> bool {
        matches!(self, AccessKind::WriteSet | AccessKind::WriteSetReadClear)
    }

    /// Write-one-to-clear is evaluated against the pre-write field value, so it is kept apart
    /// from the plain clear/set predicates.
    pub const fn is_write_one_clear(self) -> bool {
        matches!(self, AccessKind::WriteOneClear)
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for AccessKind {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AccessKind::ALL
            .into_iter()
            .find(|kind| kind.mnemonic().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LayoutError::UnknownAccess {
                mnemonic: trimmed.to_string(),
            })
    }
}

impl TryFrom<String> for AccessKind {
    type Error = LayoutError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Direction of a front-door access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Outcome of a front-door access. These are diagnostic values for the caller, not errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessStatus {
    /// The access completed and its side effects were applied.
    Okay,
    /// An access-attribute trap fired; register state is unchanged.
    Error,
    /// No register is mapped at the addressed offset.
    Hole,
}

impl AccessStatus {
    pub fn is_okay(self) -> bool {
        matches!(self, AccessStatus::Okay)
    }
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessStatus::Okay => f.write_str("OKAY"),
            AccessStatus::Error => f.write_str("ERROR"),
            AccessStatus::Hole => f.write_str("HOLE"),
        }
    }
}
