//! Serde model of a register-block description.
//!
//! ```toml
//! name = "rtr"
//!
//! [[registers]]
//! name = "local_id"
//! fields = [{ name = "local_id", size = 8, reset = 0x00, access = "RW" }]
//!
//! [[maps]]
//! name = "ahb_map"
//! physical = true
//! registers = [{ register = "local_id", offset = 0x00 }]
//! ```

use std::{fs, path::Path};

use serde::Deserialize;

use crate::error::ModelResult;
use crate::reg::{AccessKind, Field, LayoutResult, RegAddress, RegData, Register};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockDesc {
    pub name: String,
    #[serde(default)]
    pub registers: Vec<RegisterDesc>,
    #[serde(default)]
    pub maps: Vec<MapDesc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterDesc {
    pub name: String,
    /// Storage width in bits; the full 64-bit storage when omitted.
    #[serde(default)]
    pub width: Option<u32>,
    pub fields: Vec<FieldDesc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDesc {
    pub name: String,
    pub size: u32,
    #[serde(default)]
    pub reset: RegData,
    pub access: AccessKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapDesc {
    pub name: String,
    #[serde(default)]
    pub physical: bool,
    #[serde(default)]
    pub registers: Vec<RegPlacement>,
    #[serde(default)]
    pub submaps: Vec<MapPlacement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegPlacement {
    pub register: String,
    pub offset: RegAddress,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapPlacement {
    pub map: String,
    pub offset: RegAddress,
    /// Record the owning block on the linked sub-map.
    #[serde(default = "default_block_link")]
    pub block: bool,
}

fn default_block_link() -> bool {
    true
}

impl BlockDesc {
    pub fn from_toml_str(text: &str) -> ModelResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl RegisterDesc {
    /// Creates the register with its fields added in declaration order (LSB first).
    pub fn to_register(&self) -> LayoutResult<Register> {
        let mut register = match self.width {
            Some(bits) => Register::try_with_storage_bits(&self.name, bits)?,
            None => Register::new(&self.name),
        };
        for field in &self.fields {
            register.try_add_field(Field::new(&field.name, field.reset, field.size, field.access))?;
        }
        Ok(register)
    }
}
