//! Address map tree: offset tables of registers and sub-maps plus the recursive operations that
//! walk them.
//!
//! Both tables are ordered by offset. Every search visits a map's own registers before its
//! sub-maps and both in ascending offset order, so the first match is deterministic.

use std::{collections::BTreeMap, fmt};

use log::debug;
use smallvec::SmallVec;

use crate::error::ModelResult;
use crate::reg::{LayoutResult, RegAddress};

use super::model::{BlockId, MapId, RegId, RegModel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapKind {
    Logical,
    /// Top-level map tied to an interface; offsets under it are absolute addresses.
    Physical,
}

#[derive(Debug)]
pub struct AddressMap {
    name: String,
    kind: MapKind,
    pub(super) regs: BTreeMap<RegAddress, RegId>,
    pub(super) submaps: BTreeMap<RegAddress, MapId>,
    pub(super) parents: SmallVec<[MapId; 2]>,
    pub(super) reg_block: Option<BlockId>,
}

impl AddressMap {
    pub(super) fn new(name: impl Into<String>, kind: MapKind) -> Self {
        Self {
            name: name.into(),
            kind,
            regs: BTreeMap::new(),
            submaps: BTreeMap::new(),
            parents: SmallVec::new(),
            reg_block: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MapKind {
        self.kind
    }

    pub fn is_physical(&self) -> bool {
        matches!(self.kind, MapKind::Physical)
    }

    /// Directly attached registers in ascending offset order.
    pub fn registers(&self) -> impl Iterator<Item = (RegAddress, RegId)> + '_ {
        self.regs.iter().map(|(&offset, &id)| (offset, id))
    }

    /// Directly attached sub-maps in ascending base offset order.
    pub fn submaps(&self) -> impl Iterator<Item = (RegAddress, MapId)> + '_ {
        self.submaps.iter().map(|(&offset, &id)| (offset, id))
    }

    pub fn register_at(&self, offset: RegAddress) -> Option<RegId> {
        self.regs.get(&offset).copied()
    }

    pub fn submap_at(&self, offset: RegAddress) -> Option<MapId> {
        self.submaps.get(&offset).copied()
    }

    pub fn parents(&self) -> &[MapId] {
        &self.parents
    }

    /// Block that owns this map, set when the map was created inside a block or linked with one.
    pub fn reg_block(&self) -> Option<BlockId> {
        self.reg_block
    }
}

impl RegModel {
    /// Attaches `register` at `offset` inside `map` and records `map` as one of its parents.
    ///
    /// An offset holds one register; attaching over an occupied offset replaces the previous
    /// register, which is returned and loses that back-reference.
    pub fn add_reg(
        &mut self,
        map: impl Into<MapId>,
        register: RegId,
        offset: RegAddress,
    ) -> Option<RegId> {
        let map = map.into();
        let displaced = self.maps[map.index()].regs.insert(offset, register);
        if let Some(previous) = displaced {
            let parents = &mut self.registers[previous.index()].parent_maps;
            if let Some(pos) = parents.iter().position(|&parent| parent == map) {
                parents.remove(pos);
            }
            debug!(
                "{}: register '{}' at 0x{offset:X} replaced by '{}'",
                self.maps[map.index()].name(),
                self.registers[previous.index()].name(),
                self.registers[register.index()].name()
            );
        }
        self.registers[register.index()].parent_maps.push(map);
        displaced
    }

    pub fn try_add_map(
        &mut self,
        parent: impl Into<MapId>,
        child: impl Into<MapId>,
        offset: RegAddress,
        reg_block: Option<BlockId>,
    ) -> ModelResult<Option<MapId>> {
        let (parent, child) = (parent.into(), child.into());
        self.ensure_acyclic(parent, child)?;

        let displaced = self.maps[parent.index()].submaps.insert(offset, child);
        if let Some(previous) = displaced {
            let parents = &mut self.maps[previous.index()].parents;
            if let Some(pos) = parents.iter().position(|&p| p == parent) {
                parents.remove(pos);
            }
        }
        let node = &mut self.maps[child.index()];
        node.parents.push(parent);
        if reg_block.is_some() {
            node.reg_block = reg_block;
        }
        Ok(displaced)
    }

    /// Attaches `child` under `parent` at base `offset`, optionally recording the block that
    /// owns `child`.
    ///
    /// Panics if the link would make the tree cyclic.
    pub fn add_map(
        &mut self,
        parent: impl Into<MapId>,
        child: impl Into<MapId>,
        offset: RegAddress,
        reg_block: Option<BlockId>,
    ) -> Option<MapId> {
        self.try_add_map(parent, child, offset, reg_block)
            .unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_build(&mut self, map: impl Into<MapId>) -> LayoutResult<()> {
        let map = map.into();
        debug!("building address map '{}'", self.maps[map.index()].name());
        self.build_node(map)
    }

    /// Builds every register and sub-map reachable from `map`.
    pub fn build(&mut self, map: impl Into<MapId>) {
        if let Err(err) = self.try_build(map) {
            panic!("{err}");
        }
    }

    fn build_node(&mut self, map: MapId) -> LayoutResult<()> {
        let (regs, submaps) = self.children(map);
        for reg in regs {
            self.registers[reg.index()].try_build()?;
        }
        for submap in submaps {
            self.build_node(submap)?;
        }
        Ok(())
    }

    /// Resets every register reachable from `map` to its reset value.
    pub fn reset(&mut self, map: impl Into<MapId>) {
        let map = map.into();
        debug!("resetting address map '{}'", self.maps[map.index()].name());
        self.reset_node(map);
    }

    fn reset_node(&mut self, map: MapId) {
        let (regs, submaps) = self.children(map);
        for reg in regs {
            self.registers[reg.index()].reset();
        }
        for submap in submaps {
            self.reset_node(submap);
        }
    }

    fn children(&self, map: MapId) -> (SmallVec<[RegId; 16]>, SmallVec<[MapId; 4]>) {
        let node = &self.maps[map.index()];
        (
            node.regs.values().copied().collect(),
            node.submaps.values().copied().collect(),
        )
    }

    /// Depth-first search by register name; own registers first, then sub-maps, both by
    /// ascending offset. Only the first match is returned even when the name repeats.
    pub fn reg_by_name(&self, map: impl Into<MapId>, name: &str) -> Option<RegId> {
        let node = &self.maps[map.into().index()];
        node.regs
            .values()
            .copied()
            .find(|reg| self.registers[reg.index()].name() == name)
            .or_else(|| {
                node.submaps
                    .values()
                    .find_map(|&submap| self.reg_by_name(submap, name))
            })
    }

    /// Every register named `name` under `map`, in the order `reg_by_name` visits them. A
    /// register attached at several offsets appears once per attachment.
    pub fn regs_by_name(&self, map: impl Into<MapId>, name: &str) -> Vec<RegId> {
        let mut found = Vec::new();
        self.collect_by_name(map.into(), name, &mut found);
        found
    }

    fn collect_by_name(&self, map: MapId, name: &str, found: &mut Vec<RegId>) {
        let node = &self.maps[map.index()];
        found.extend(
            node.regs
                .values()
                .copied()
                .filter(|reg| self.registers[reg.index()].name() == name),
        );
        for &submap in node.submaps.values() {
            self.collect_by_name(submap, name, found);
        }
    }

    /// Resolves `offset` (an absolute address for a physical map) to a register.
    ///
    /// An exact register entry wins. Otherwise every sub-map whose base is at or below `offset`
    /// is searched in ascending base order with the offset rebased to it. A sub-map's extent is
    /// not checked before descending, so a low-based sub-map can answer for an address that a
    /// later sub-map was meant to cover.
    pub fn reg_by_offset(&self, map: impl Into<MapId>, offset: RegAddress) -> Option<RegId> {
        let node = &self.maps[map.into().index()];
        if let Some(&reg) = node.regs.get(&offset) {
            return Some(reg);
        }
        node.submaps
            .range(..=offset)
            .find_map(|(&base, &submap)| self.reg_by_offset(submap, offset - base))
    }

    /// Every offset at which `register` appears under `map`, relative to `map`: direct entries
    /// first, then each sub-map's results shifted by its base. Empty when it is not mapped.
    /// Placements that would lie past the end of the address space are left out.
    pub fn reg_offsets(&self, map: impl Into<MapId>, register: RegId) -> Vec<RegAddress> {
        let node = &self.maps[map.into().index()];
        let mut offsets: Vec<RegAddress> = node
            .regs
            .iter()
            .filter(|&(_, &reg)| reg == register)
            .map(|(&offset, _)| offset)
            .collect();
        for (&base, &submap) in &node.submaps {
            offsets.extend(
                self.reg_offsets(submap, register)
                    .into_iter()
                    .filter_map(|offset| base.checked_add(offset)),
            );
        }
        offsets
    }

    /// Human-readable listing of `map`: its registers with offsets and its sub-maps.
    pub fn display_map(&self, map: impl Into<MapId>) -> MapDisplay<'_> {
        MapDisplay {
            model: self,
            map: map.into(),
        }
    }
}

pub struct MapDisplay<'m> {
    model: &'m RegModel,
    map: MapId,
}

impl fmt::Display for MapDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.model.map(self.map);
        writeln!(f, "Address map: {}", node.name())?;
        for (offset, reg) in node.registers() {
            write!(f, "0x{offset:08X}  {}", self.model.register(reg))?;
        }
        for (offset, submap) in node.submaps() {
            writeln!(f, "0x{offset:08X}  map {}", self.model.map(submap).name())?;
        }
        Ok(())
    }
}
