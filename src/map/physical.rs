//! Address-keyed access through a physical map.
//!
//! A physical map is the root of a tree as seen from one interface, so the offsets it resolves
//! are absolute addresses. Front-door accesses to an unmapped address report `Hole`; backdoor
//! accesses assume the address is mapped.

use log::{trace, warn};

use crate::reg::{AccessStatus, RegAddress, RegData};

use super::model::{PhysMapId, RegId, RegModel};

pub struct PhysicalAddressMap<'m> {
    model: &'m mut RegModel,
    id: PhysMapId,
}

impl RegModel {
    /// Opens the address-keyed view of a physical map.
    pub fn physical(&mut self, id: PhysMapId) -> PhysicalAddressMap<'_> {
        PhysicalAddressMap { model: self, id }
    }
}

impl PhysicalAddressMap<'_> {
    pub fn id(&self) -> PhysMapId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.model.map(self.id).name()
    }

    pub fn resolve(&self, address: RegAddress) -> Option<RegId> {
        self.model.reg_by_offset(self.id, address)
    }

    /// Front-door read at `address`; `(0, Hole)` when nothing is mapped there.
    pub fn read(&mut self, address: RegAddress) -> (RegData, AccessStatus) {
        let Some(reg) = self.resolve(address) else {
            warn!("{}: read from unmapped address 0x{address:X}", self.name());
            return (0, AccessStatus::Hole);
        };
        let register = self.model.register_mut(reg);
        let (data, status) = register.read();
        trace!(
            "read 0x{address:X} ({}) -> 0x{data:X} {status}",
            register.name()
        );
        (data, status)
    }

    /// Front-door write at `address`; `Hole` without any mutation when nothing is mapped there.
    pub fn write(&mut self, address: RegAddress, data: RegData) -> AccessStatus {
        let Some(reg) = self.resolve(address) else {
            warn!("{}: write to unmapped address 0x{address:X}", self.name());
            return AccessStatus::Hole;
        };
        let register = self.model.register_mut(reg);
        let status = register.write(data);
        trace!(
            "write 0x{address:X} ({}) <- 0x{data:X} {status}",
            register.name()
        );
        status
    }

    pub fn try_get(&self, address: RegAddress) -> Option<RegData> {
        self.resolve(address)
            .map(|reg| self.model.register(reg).get())
    }

    /// Backdoor read at `address`. Panics if no register is mapped there.
    pub fn get(&self, address: RegAddress) -> RegData {
        self.try_get(address).unwrap_or_else(|| {
            panic!("{}: no register mapped at 0x{address:X}", self.name())
        })
    }

    /// Backdoor write at `address`; returns the register that was set.
    pub fn try_set(&mut self, address: RegAddress, data: RegData) -> Option<RegId> {
        let reg = self.resolve(address)?;
        self.model.register_mut(reg).set(data);
        Some(reg)
    }

    /// Backdoor write at `address`. Panics if no register is mapped there.
    pub fn set(&mut self, address: RegAddress, data: RegData) {
        if self.try_set(address, data).is_none() {
            panic!("{}: no register mapped at 0x{address:X}", self.name());
        }
    }
}
