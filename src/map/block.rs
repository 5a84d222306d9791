//! Register block: the assembly point that owns a device's registers and maps by name.
//!
//! It holds no resolution logic. Maps created inside a block (or linked with one) keep its
//! handle, which is how code holding only a map reaches sibling registers and maps.

use ahash::AHashMap;

use crate::error::{ModelError, ModelResult};

use super::model::{MapId, RegId};

#[derive(Debug, Clone)]
pub struct RegBlock {
    name: String,
    registers: AHashMap<String, RegId>,
    maps: AHashMap<String, MapId>,
}

impl RegBlock {
    pub(super) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registers: AHashMap::new(),
            maps: AHashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register(&self, name: &str) -> Option<RegId> {
        self.registers.get(name).copied()
    }

    pub fn map(&self, name: &str) -> Option<MapId> {
        self.maps.get(name).copied()
    }

    /// Registers owned by this block, sorted by handle (creation order).
    pub fn registers(&self) -> Vec<RegId> {
        let mut ids: Vec<_> = self.registers.values().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Maps owned by this block, sorted by handle (creation order).
    pub fn maps(&self) -> Vec<MapId> {
        let mut ids: Vec<_> = self.maps.values().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub(super) fn insert_register(&mut self, name: &str, id: RegId) -> ModelResult<()> {
        if self.registers.contains_key(name) {
            return Err(self.duplicate("register", name));
        }
        self.registers.insert(name.to_string(), id);
        Ok(())
    }

    pub(super) fn insert_map(&mut self, name: &str, id: MapId) -> ModelResult<()> {
        if self.maps.contains_key(name) {
            return Err(self.duplicate("map", name));
        }
        self.maps.insert(name.to_string(), id);
        Ok(())
    }

    fn duplicate(&self, kind: &'static str, name: &str) -> ModelError {
        ModelError::DuplicateName {
            block: self.name.clone(),
            kind,
            name: name.to_string(),
        }
    }
}
