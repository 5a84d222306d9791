//! Turns a `BlockDesc` into registers, maps and links inside a `RegModel`.

use log::debug;

use crate::error::{ModelError, ModelResult};
use crate::map::{BlockId, MapId, RegModel};

use super::desc::{BlockDesc, MapDesc};

impl BlockDesc {
    /// Creates the block, its registers and maps, wires every placement, then builds and resets
    /// each root map of the block.
    ///
    /// Names and offsets come from runtime input here, so duplicates and dangling references
    /// are returned as errors rather than treated as fatal. On error the model is left exactly
    /// as it was before the call.
    pub fn instantiate(&self, model: &mut RegModel) -> ModelResult<BlockId> {
        let checkpoint = model.checkpoint();
        self.assemble(model).inspect_err(|err| {
            debug!("discarding partially instantiated block '{}': {err}", self.name);
            model.rollback(checkpoint);
        })
    }

    fn assemble(&self, model: &mut RegModel) -> ModelResult<BlockId> {
        let block = model.add_block(&self.name);

        for desc in &self.registers {
            let register = desc.to_register()?;
            model.add_register_to(block, register)?;
        }

        for desc in &self.maps {
            if desc.physical {
                model.add_physical_map_to(block, &desc.name)?;
            } else {
                model.add_address_map_to(block, &desc.name)?;
            }
        }

        for desc in &self.maps {
            self.place(model, block, desc)?;
        }

        let roots: Vec<MapId> = model
            .block(block)
            .maps()
            .into_iter()
            .filter(|&map| model.parents_of(map).is_empty())
            .collect();
        for root in roots {
            model.try_build(root)?;
            model.reset(root);
        }

        // registers that were declared but never placed still get their masks
        let registers = model.block(block).registers();
        for reg in registers {
            let register = model.register_mut(reg);
            if !register.is_built() {
                register.try_build()?;
                register.reset();
            }
        }

        debug!(
            "instantiated block '{}' ({} registers, {} maps)",
            self.name,
            self.registers.len(),
            self.maps.len()
        );
        Ok(block)
    }

    fn place(&self, model: &mut RegModel, block: BlockId, desc: &MapDesc) -> ModelResult<()> {
        let map = model
            .block(block)
            .map(&desc.name)
            .ok_or_else(|| ModelError::UnknownMap {
                map: self.name.clone(),
                submap: desc.name.clone(),
            })?;

        for placement in &desc.registers {
            let reg = model
                .block(block)
                .register(&placement.register)
                .ok_or_else(|| ModelError::UnknownRegister {
                    map: desc.name.clone(),
                    register: placement.register.clone(),
                })?;
            if model.map(map).register_at(placement.offset).is_some() {
                return Err(ModelError::OffsetInUse {
                    map: desc.name.clone(),
                    offset: placement.offset,
                });
            }
            model.add_reg(map, reg, placement.offset);
        }

        for placement in &desc.submaps {
            let child = model
                .block(block)
                .map(&placement.map)
                .ok_or_else(|| ModelError::UnknownMap {
                    map: desc.name.clone(),
                    submap: placement.map.clone(),
                })?;
            if model.map(map).submap_at(placement.offset).is_some() {
                return Err(ModelError::OffsetInUse {
                    map: desc.name.clone(),
                    offset: placement.offset,
                });
            }
            let link = placement.block.then_some(block);
            model.try_add_map(map, child, placement.offset, link)?;
        }
        Ok(())
    }
}
