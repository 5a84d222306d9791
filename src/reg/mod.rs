//! Field and register primitives: attribute semantics, masks and the access protocol.

pub mod access;
pub mod error;
pub mod field;
pub mod hooks;
pub mod register;

/// Register storage type. Bits outside any field are always zero.
pub type RegData = u64;

/// Offsets and absolute addresses inside an address map.
pub type RegAddress = u64;

pub use access::{AccessKind, AccessStatus, Direction};
pub use error::{LayoutError, LayoutResult};
pub use field::Field;
pub use hooks::{AccessEvent, AccessHook, StandardHook, standard_post_access, standard_pre_access};
pub use register::Register;
