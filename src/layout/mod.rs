//! Declarative register-block descriptions loaded from TOML.

pub mod desc;
pub mod instantiate;

pub use desc::{BlockDesc, FieldDesc, MapDesc, MapPlacement, RegPlacement, RegisterDesc};
