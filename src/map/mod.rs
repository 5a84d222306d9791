//! Hierarchical address space: the model arena, address maps, physical maps and register blocks.

pub mod address_map;
pub mod block;
pub mod model;
pub mod physical;

pub use address_map::{AddressMap, MapDisplay, MapKind};
pub use block::RegBlock;
pub use model::{BlockId, MapId, PhysMapId, RegId, RegModel};
pub use physical::PhysicalAddressMap;
