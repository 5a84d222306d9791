#![allow(dead_code)]

use regmodel::{AccessKind, BlockId, Field, PhysMapId, RegId, RegModel, Register};

/// Router register block exposed on two interfaces with identical register placement.
pub struct Router {
    pub model: RegModel,
    pub block: BlockId,
    pub ahb: PhysMapId,
    pub uart: PhysMapId,
}

impl Router {
    pub fn reg(&self, name: &str) -> RegId {
        self.model
            .block(self.block)
            .register(name)
            .unwrap_or_else(|| panic!("router has no register '{name}'"))
    }

    /// First absolute address of `name` as seen from `map`.
    pub fn address(&self, map: PhysMapId, name: &str) -> u64 {
        let reg = self.reg(name);
        *self
            .model
            .reg_offsets(map, reg)
            .first()
            .unwrap_or_else(|| panic!("'{name}' is not mapped"))
    }
}

fn single(name: &str, reset: u64, access: AccessKind) -> Register {
    Register::with_storage_bits(name, 8).with_field(Field::new(name, reset, 8, access))
}

fn enables(name: &str, prefix: &str) -> Register {
    let mut register = Register::with_storage_bits(name, 8);
    for i in 0..4 {
        register.add_field(Field::new(format!("{prefix}_{i}"), 0x1, 1, AccessKind::ReadWrite));
    }
    register.with_field(Field::new("reserved", 0x0, 4, AccessKind::ReadOnly))
}

fn prio_destination() -> Register {
    let mut register = Register::with_storage_bits("prio_destination", 8);
    for i in 0..4u64 {
        register.add_field(Field::new(format!("prio_{i}"), i, 2, AccessKind::ReadWrite));
    }
    register
}

/// Register/offset pairs shared by both interfaces.
pub const PLACEMENT: &[(&str, u64)] = &[
    ("local_id", 0x00),
    ("software_reset", 0x04),
    ("input_enable", 0x08),
    ("output_enable", 0x0C),
    ("prio_destination", 0x10),
    ("dropped_ch_0", 0x30),
    ("dropped_ch_1", 0x31),
    ("dropped_ch_2", 0x32),
    ("dropped_ch_3", 0x33),
    ("ld_baud", 0xFB),
    ("baud_0", 0xFC),
    ("baud_1", 0xFD),
    ("baud_2", 0xFE),
    ("baud_3", 0xFF),
];

pub fn router() -> Router {
    let mut model = RegModel::new();
    let block = model.add_block("my_reg_block");

    let mut registers = vec![
        single("local_id", 0x00, AccessKind::ReadWrite),
        single("software_reset", 0x00, AccessKind::WriteOneClear),
        enables("input_enable", "input_en"),
        enables("output_enable", "output_en"),
        prio_destination(),
    ];
    for i in 0..4 {
        registers.push(single(&format!("dropped_ch_{i}"), 0x0, AccessKind::ReadClear));
    }
    registers.push(single("ld_baud", 0x0, AccessKind::WriteOneClear));
    registers.push(single("baud_0", 0x00, AccessKind::ReadWrite));
    registers.push(single("baud_1", 0x10, AccessKind::ReadWrite));
    registers.push(single("baud_2", 0x00, AccessKind::ReadWrite));
    registers.push(
        Register::with_storage_bits("baud_3", 8)
            .with_field(Field::new("baud_3", 0x1, 4, AccessKind::ReadWrite))
            .with_field(Field::new("reserved", 0x0, 4, AccessKind::ReadOnly)),
    );
    for register in registers {
        model
            .add_register_to(block, register)
            .expect("router register names are unique");
    }

    let ahb = model
        .add_physical_map_to(block, "ahb_map")
        .expect("ahb map");
    let uart = model
        .add_physical_map_to(block, "uart_map")
        .expect("uart map");

    let mut router = Router {
        model,
        block,
        ahb,
        uart,
    };
    for map in [ahb, uart] {
        for &(name, offset) in PLACEMENT {
            let reg = router.reg(name);
            router.model.add_reg(map, reg, offset);
        }
        router.model.build(map);
        router.model.reset(map);
    }
    router
}
