//! Arena that owns every register, address map and register block of a device model.
//!
//! Maps refer to registers and to each other through `Copy` handles, so one register can sit at
//! several offsets in several maps while the arena stays its single owner. Back-references
//! (register -> parent maps, map -> parent maps, map -> owning block) are handle lists too.

use crate::error::{ModelError, ModelResult};
use crate::reg::Register;

use super::address_map::{AddressMap, MapKind};
use super::block::RegBlock;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn from_index(index: usize) -> Self {
                Self(u32::try_from(index).expect("arena index exceeds u32"))
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Handle to a register owned by a [`RegModel`].
    RegId
);
arena_id!(
    /// Handle to an address map owned by a [`RegModel`].
    MapId
);
arena_id!(
    /// Handle to a register block owned by a [`RegModel`].
    BlockId
);

/// A map handle that is known to refer to a physical (address-addressable) map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhysMapId(MapId);

impl PhysMapId {
    pub fn map(self) -> MapId {
        self.0
    }
}

impl From<PhysMapId> for MapId {
    fn from(value: PhysMapId) -> Self {
        value.0
    }
}

/// Arena lengths captured before a batch of insertions, see `RegModel::rollback`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    registers: usize,
    maps: usize,
    blocks: usize,
}

#[derive(Default)]
pub struct RegModel {
    pub(super) registers: Vec<Register>,
    pub(super) maps: Vec<AddressMap>,
    pub(super) blocks: Vec<RegBlock>,
}

impl RegModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_register(&mut self, register: Register) -> RegId {
        self.registers.push(register);
        RegId::from_index(self.registers.len() - 1)
    }

    pub fn add_address_map(&mut self, name: impl Into<String>) -> MapId {
        self.maps.push(AddressMap::new(name, MapKind::Logical));
        MapId::from_index(self.maps.len() - 1)
    }

    pub fn add_physical_map(&mut self, name: impl Into<String>) -> PhysMapId {
        self.maps.push(AddressMap::new(name, MapKind::Physical));
        PhysMapId(MapId::from_index(self.maps.len() - 1))
    }

    pub fn add_block(&mut self, name: impl Into<String>) -> BlockId {
        self.blocks.push(RegBlock::new(name));
        BlockId::from_index(self.blocks.len() - 1)
    }

    /// Creates a register owned by `block` and indexes it there by name.
    pub fn add_register_to(&mut self, block: BlockId, register: Register) -> ModelResult<RegId> {
        let id = RegId::from_index(self.registers.len());
        self.blocks[block.index()].insert_register(register.name(), id)?;
        self.registers.push(register);
        Ok(id)
    }

    pub fn add_address_map_to(
        &mut self,
        block: BlockId,
        name: impl Into<String>,
    ) -> ModelResult<MapId> {
        self.add_map_to(block, name.into(), MapKind::Logical)
    }

    pub fn add_physical_map_to(
        &mut self,
        block: BlockId,
        name: impl Into<String>,
    ) -> ModelResult<PhysMapId> {
        self.add_map_to(block, name.into(), MapKind::Physical)
            .map(PhysMapId)
    }

    fn add_map_to(&mut self, block: BlockId, name: String, kind: MapKind) -> ModelResult<MapId> {
        let id = MapId::from_index(self.maps.len());
        self.blocks[block.index()].insert_map(&name, id)?;
        let mut map = AddressMap::new(name, kind);
        map.reg_block = Some(block);
        self.maps.push(map);
        Ok(id)
    }

    pub fn register(&self, id: RegId) -> &Register {
        &self.registers[id.index()]
    }

    pub fn register_mut(&mut self, id: RegId) -> &mut Register {
        &mut self.registers[id.index()]
    }

    pub fn map(&self, id: impl Into<MapId>) -> &AddressMap {
        &self.maps[id.into().index()]
    }

    pub fn block(&self, id: BlockId) -> &RegBlock {
        &self.blocks[id.index()]
    }

    /// Returns the physical handle for `id` if the map was created as a physical map.
    pub fn as_physical(&self, id: MapId) -> Option<PhysMapId> {
        self.maps[id.index()].is_physical().then_some(PhysMapId(id))
    }

    pub fn registers(&self) -> impl Iterator<Item = (RegId, &Register)> + '_ {
        self.registers
            .iter()
            .enumerate()
            .map(|(index, register)| (RegId::from_index(index), register))
    }

    pub fn maps(&self) -> impl Iterator<Item = (MapId, &AddressMap)> + '_ {
        self.maps
            .iter()
            .enumerate()
            .map(|(index, map)| (MapId::from_index(index), map))
    }

    /// Maps that are not attached below any other map.
    pub fn root_maps(&self) -> impl Iterator<Item = MapId> + '_ {
        self.maps()
            .filter(|(_, map)| map.parents().is_empty())
            .map(|(id, _)| id)
    }

    /// Back-references of `register`: one entry per `add_reg` that attached it.
    pub fn parent_maps_of(&self, register: RegId) -> &[MapId] {
        self.registers[register.index()].parent_maps()
    }

    pub fn parents_of(&self, map: impl Into<MapId>) -> &[MapId] {
        self.maps[map.into().index()].parents()
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            registers: self.registers.len(),
            maps: self.maps.len(),
            blocks: self.blocks.len(),
        }
    }

    /// Drops every node created after `checkpoint` together with any link to it left in the
    /// surviving nodes.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.registers.truncate(checkpoint.registers);
        self.maps.truncate(checkpoint.maps);
        self.blocks.truncate(checkpoint.blocks);

        let live_map = |id: &MapId| id.index() < checkpoint.maps;
        for register in &mut self.registers {
            register.parent_maps.retain(|id| live_map(id));
        }
        for map in &mut self.maps {
            map.regs.retain(|_, reg| reg.index() < checkpoint.registers);
            map.submaps.retain(|_, id| live_map(id));
            map.parents.retain(|id| live_map(id));
            if map.reg_block.is_some_and(|block| block.index() >= checkpoint.blocks) {
                map.reg_block = None;
            }
        }
    }

    pub(super) fn ensure_acyclic(&self, parent: MapId, child: MapId) -> ModelResult<()> {
        if parent == child || self.reaches(child, parent) {
            return Err(ModelError::MapCycle {
                parent: self.maps[parent.index()].name().to_string(),
                child: self.maps[child.index()].name().to_string(),
            });
        }
        Ok(())
    }

    fn reaches(&self, from: MapId, target: MapId) -> bool {
        self.maps[from.index()]
            .submaps
            .values()
            .any(|&next| next == target || self.reaches(next, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::{AccessKind, Field};

    #[test]
    fn handles_index_into_their_arena() {
        let mut model = RegModel::new();
        let a = model.add_register(Register::new("a"));
        let b = model.add_register(Register::new("b"));
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(model.register(b).name(), "b");

        let logical = model.add_address_map("logical");
        let physical = model.add_physical_map("physical");
        assert_eq!(model.as_physical(logical), None, "logical maps have no physical handle");
        assert_eq!(model.as_physical(physical.map()), Some(physical));
    }

    #[test]
    fn block_members_are_indexed_and_back_referenced() {
        let mut model = RegModel::new();
        let block = model.add_block("rtr");
        let reg = model
            .add_register_to(
                block,
                Register::new("local_id").with_field(Field::new("id", 0, 8, AccessKind::ReadWrite)),
            )
            .expect("first register");
        let map = model.add_physical_map_to(block, "ahb_map").expect("first map");

        assert_eq!(model.block(block).register("local_id"), Some(reg));
        assert_eq!(model.block(block).map("ahb_map"), Some(map.map()));
        assert_eq!(model.map(map).reg_block(), Some(block));

        let dup = model.add_register_to(block, Register::new("local_id"));
        assert!(
            matches!(dup, Err(ModelError::DuplicateName { .. })),
            "names are unique within a block"
        );
        assert_eq!(model.registers().count(), 1, "rejected register is not stored");
    }

    #[test]
    fn root_maps_excludes_attached_children() {
        let mut model = RegModel::new();
        let top = model.add_physical_map("top");
        let child = model.add_address_map("child");
        model.add_map(top, child, 0x100, None);
        let roots: Vec<_> = model.root_maps().collect();
        assert_eq!(roots, vec![top.map()]);
        assert_eq!(model.parents_of(child), &[top.map()]);
    }
}
