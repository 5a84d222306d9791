//! Register-model engine for verification and simulation tooling.
//!
//! Models memory-mapped registers built from bit fields with hardware access side effects
//! (clear-on-read, set-on-write, write-one-to-clear, write-only traps, ...), places them in a
//! tree of address maps, and resolves accesses by name or by absolute address.
//!
//! * `reg`: fields, access attributes, registers and their access hooks.
//! * `map`: the model arena, address maps, physical maps and register blocks.
//! * `layout`: register blocks described in TOML.
//!
//! Assembly is done once: create registers and maps in a [`RegModel`], link them, then call
//! [`RegModel::build`] on each root map before the first access. The model does no internal
//! locking; a multi-threaded host serialises access to it.

pub mod error;
pub mod layout;
pub mod map;
pub mod reg;

pub use error::{ModelError, ModelResult};
pub use layout::BlockDesc;
pub use map::{
    AddressMap, BlockId, MapId, MapKind, PhysMapId, PhysicalAddressMap, RegBlock, RegId, RegModel,
};
pub use reg::{
    AccessEvent, AccessHook, AccessKind, AccessStatus, Direction, Field, LayoutError, RegAddress,
    RegData, Register, StandardHook,
};
