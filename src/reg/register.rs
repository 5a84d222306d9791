//! Register model: an ordered, contiguous list of fields packed LSB first into one value.
//!
//! `read`/`write` are the front door: they go through the access hook, apply the read and write
//! masks and trigger field side effects. `get`/`set` are the backdoor and touch the raw value
//! only. `build` must run once the field list is final and before the first front-door access;
//! address maps call it for every register they hold.

use std::fmt;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::map::MapId;

use super::access::AccessStatus;
use super::error::{LayoutError, LayoutResult};
use super::field::Field;
use super::hooks::{AccessEvent, AccessHook, STANDARD_HOOK};
use super::RegData;

pub struct Register {
    name: String,
    value: RegData,
    storage_bits: u32,
    fields: SmallVec<[Field; 8]>,
    field_index: AHashMap<String, usize>,
    write_mask: RegData,
    read_mask: RegData,
    reset_value: RegData,
    built: bool,
    hook: Option<Box<dyn AccessHook>>,
    pub(crate) parent_maps: SmallVec<[MapId; 2]>,
}

impl Register {
    /// Creates an empty register backed by the full 64-bit storage.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0,
            storage_bits: RegData::BITS,
            fields: SmallVec::new(),
            field_index: AHashMap::new(),
            write_mask: 0,
            read_mask: 0,
            reset_value: 0,
            built: false,
            hook: None,
            parent_maps: SmallVec::new(),
        }
    }

    pub fn try_with_storage_bits(name: impl Into<String>, bits: u32) -> LayoutResult<Self> {
        let mut register = Self::new(name);
        if bits == 0 || bits > RegData::BITS {
            return Err(LayoutError::InvalidStorageWidth {
                register: register.name,
                bits,
            });
        }
        register.storage_bits = bits;
        Ok(register)
    }

    /// Creates an empty register whose fields may occupy at most `bits` bits.
    pub fn with_storage_bits(name: impl Into<String>, bits: u32) -> Self {
        Self::try_with_storage_bits(name, bits).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Fluent form of [`Register::add_field`].
    pub fn with_field(mut self, field: Field) -> Self {
        self.add_field(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_bits(&self) -> u32 {
        self.storage_bits
    }

    pub fn try_add_field(&mut self, mut field: Field) -> LayoutResult<()> {
        if field.size() == 0 {
            return Err(LayoutError::ZeroSizeField {
                register: self.name.clone(),
                field: field.name().to_string(),
            });
        }
        if self.field_index.contains_key(field.name()) {
            return Err(LayoutError::DuplicateField {
                register: self.name.clone(),
                field: field.name().to_string(),
            });
        }

        let lsb = self.size_bits();
        let fits = lsb
            .checked_add(field.size())
            .is_some_and(|bits| bits <= self.storage_bits);
        if !fits {
            return Err(LayoutError::ExceedsStorage {
                register: self.name.clone(),
                bits: lsb.saturating_add(field.size()),
                storage_bits: self.storage_bits,
            });
        }

        field.place(lsb);
        self.field_index
            .insert(field.name().to_string(), self.fields.len());
        self.fields.push(field);
        Ok(())
    }

    /// Appends `field` directly above the previous one.
    ///
    /// Panics on a zero-sized field, a duplicate name or when the register would outgrow its
    /// storage; those are mistakes in the register definition.
    pub fn add_field(&mut self, field: Field) {
        if let Err(err) = self.try_add_field(field) {
            panic!("{err}");
        }
    }

    pub fn try_build(&mut self) -> LayoutResult<()> {
        self.validate_fields()?;

        let mut write_mask = 0;
        let mut read_mask = 0;
        let mut reset_value = 0;
        for field in &self.fields {
            if field.access().is_writable() {
                write_mask |= field.register_mask();
            }
            if field.access().is_readable() {
                read_mask |= field.register_mask();
            }
            reset_value |= field.reset_bits();
        }

        self.write_mask = write_mask;
        self.read_mask = read_mask;
        self.reset_value = reset_value;
        self.built = true;
        Ok(())
    }

    /// Recomputes the masks and the reset value from the current field list.
    pub fn build(&mut self) {
        if let Err(err) = self.try_build() {
            panic!("{err}");
        }
    }

    fn validate_fields(&self) -> LayoutResult<()> {
        let bits = self.size_bits();
        if bits > self.storage_bits {
            return Err(LayoutError::ExceedsStorage {
                register: self.name.clone(),
                bits,
                storage_bits: self.storage_bits,
            });
        }
        debug_assert!(
            self.fields
                .windows(2)
                .all(|pair| pair[0].lsb() + pair[0].size() == pair[1].lsb()),
            "fields of '{}' are not contiguous",
            self.name
        );
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn reset(&mut self) {
        self.value = self.reset_value;
    }

    /// Front-door read. Returns the masked value and `Okay`, or `(0, Error)` when a field traps
    /// the access; a trapped read leaves the register untouched.
    pub fn read(&mut self) -> (RegData, AccessStatus) {
        debug_assert!(self.built, "register '{}' read before build()", self.name);
        let hook = self.hook.as_deref().unwrap_or(&STANDARD_HOOK);
        let event = AccessEvent::read(self.value);

        let status = hook.pre_access(&self.fields, &event);
        if status != AccessStatus::Okay {
            return (0, status);
        }
        let data = self.value & self.read_mask;
        hook.post_access(&self.fields, &event, &mut self.value);
        (data, status)
    }

    /// Front-door write. The value becomes `data & write_mask` before the post-access side
    /// effects run.
    pub fn write(&mut self, data: RegData) -> AccessStatus {
        debug_assert!(self.built, "register '{}' written before build()", self.name);
        let hook = self.hook.as_deref().unwrap_or(&STANDARD_HOOK);
        let event = AccessEvent::write(data, self.value);

        let status = hook.pre_access(&self.fields, &event);
        if status != AccessStatus::Okay {
            return status;
        }
        self.value = data & self.write_mask;
        hook.post_access(&self.fields, &event, &mut self.value);
        status
    }

    /// Backdoor read: raw value, no mask, no hooks.
    pub fn get(&self) -> RegData {
        self.value
    }

    /// Backdoor write: raw value, no mask, no hooks.
    pub fn set(&mut self, data: RegData) {
        self.value = data;
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_index.get(name).map(|&index| &self.fields[index])
    }

    /// Fields in bit order, LSB first.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &Field> + '_ {
        self.fields.iter()
    }

    fn lookup(&self, name: &str) -> LayoutResult<&Field> {
        self.field(name).ok_or_else(|| LayoutError::UnknownField {
            register: self.name.clone(),
            field: name.to_string(),
        })
    }

    pub fn try_field_value(&self, name: &str) -> LayoutResult<RegData> {
        Ok(self.lookup(name)?.extract(self.value))
    }

    /// Extracts field `name` from the raw value. Panics if the field does not exist.
    pub fn field_value(&self, name: &str) -> RegData {
        self.try_field_value(name).unwrap_or_else(|err| panic!("{err}"))
    }

    pub fn try_set_field_value(&mut self, name: &str, field_value: RegData) -> LayoutResult<()> {
        let value = self.lookup(name)?.insert(self.value, field_value);
        self.value = value;
        Ok(())
    }

    /// Replaces field `name` in the raw value without running any hook. Panics if the field
    /// does not exist.
    pub fn set_field_value(&mut self, name: &str, field_value: RegData) {
        if let Err(err) = self.try_set_field_value(name, field_value) {
            panic!("{err}");
        }
    }

    /// Sum of all field widths in bits.
    pub fn size_bits(&self) -> u32 {
        self.fields.iter().map(Field::size).sum()
    }

    pub fn write_mask(&self) -> RegData {
        self.write_mask
    }

    pub fn read_mask(&self) -> RegData {
        self.read_mask
    }

    pub fn reset_value(&self) -> RegData {
        self.reset_value
    }

    /// Replaces the standard attribute behaviour with `hook`.
    pub fn set_hook(&mut self, hook: impl AccessHook + 'static) {
        self.hook = Some(Box::new(hook));
    }

    pub fn clear_hook(&mut self) {
        self.hook = None;
    }

    pub fn has_custom_hook(&self) -> bool {
        self.hook.is_some()
    }

    /// Every map that has this register attached, once per attachment.
    pub fn parent_maps(&self) -> &[MapId] {
        &self.parent_maps
    }
}

impl fmt::Debug for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Register")
            .field("name", &self.name)
            .field("value", &format_args!("0x{:X}", self.value))
            .field("fields", &self.fields)
            .field("built", &self.built)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} value=0x{:X} reset=0x{:X} read_mask=0x{:X} write_mask=0x{:X}",
            self.name, self.value, self.reset_value, self.read_mask, self.write_mask
        )?;
        for field in &self.fields {
            writeln!(f, "  {field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reg::{AccessKind, Direction, standard_post_access};

    fn built(register: Register) -> Register {
        let mut register = register;
        register.build();
        register.reset();
        register
    }

    #[test]
    fn add_field_assigns_contiguous_positions() {
        let register = Register::new("input_enable")
            .with_field(Field::new("en_0", 1, 1, AccessKind::ReadWrite))
            .with_field(Field::new("en_1", 1, 1, AccessKind::ReadWrite))
            .with_field(Field::new("reserved", 0, 6, AccessKind::ReadOnly));
        let positions: Vec<_> = register.fields().map(|f| (f.lsb(), f.size())).collect();
        assert_eq!(positions, vec![(0, 1), (1, 1), (2, 6)]);
        assert_eq!(register.size_bits(), 8);
    }

    #[test]
    fn build_derives_masks_and_reset_from_fields() {
        let mut register = Register::new("mixed")
            .with_field(Field::new("ro", 0x3, 4, AccessKind::ReadOnly))
            .with_field(Field::new("rw", 0x1F, 4, AccessKind::ReadWrite))
            .with_field(Field::new("wo", 0x0, 4, AccessKind::WriteOnly))
            .with_field(Field::new("w1c", 0xA, 4, AccessKind::WriteOneClear));
        register.build();
        assert_eq!(register.read_mask(), 0xF0FF, "WO bits are not readable");
        assert_eq!(register.write_mask(), 0xFFF0, "RO bits are not writable");
        assert_eq!(register.reset_value(), 0xA0F3, "reset values are truncated per field");

        let masks = (register.read_mask(), register.write_mask(), register.reset_value());
        register.build();
        assert_eq!(
            (register.read_mask(), register.write_mask(), register.reset_value()),
            masks,
            "rebuilding an unchanged register is idempotent"
        );
    }

    #[test]
    fn rw_round_trip_has_no_side_effects() {
        let mut register = built(
            Register::new("baud_3")
                .with_field(Field::new("baud_3", 0x1, 4, AccessKind::ReadWrite))
                .with_field(Field::new("reserved", 0x0, 4, AccessKind::ReadOnly)),
        );
        assert_eq!(register.write(0xA2), AccessStatus::Okay);
        assert_eq!(register.read(), (0x02, AccessStatus::Okay));
        assert_eq!(register.read(), (0x02, AccessStatus::Okay), "second read is stable");
    }

    #[test]
    fn read_clear_field_clears_after_first_read() {
        let mut register = built(
            Register::new("dropped_ch")
                .with_field(Field::new("count", 0, 8, AccessKind::ReadClear)),
        );
        register.set_field_value("count", 0x5A);
        assert_eq!(register.read(), (0x5A, AccessStatus::Okay));
        assert_eq!(register.read(), (0x00, AccessStatus::Okay));
    }

    #[test]
    fn write_one_clear_clears_only_written_ones() {
        let mut register = built(
            Register::new("software_reset")
                .with_field(Field::new("sw_reset", 0, 8, AccessKind::WriteOneClear)),
        );
        register.set_field_value("sw_reset", 0xFF);
        assert_eq!(register.write(0x01), AccessStatus::Okay);
        assert_eq!(register.field_value("sw_reset"), 0xFE);
        assert_eq!(register.write(0xF0), AccessStatus::Okay);
        assert_eq!(register.field_value("sw_reset"), 0x0E);
    }

    #[test]
    fn set_on_write_and_clear_on_read_go_through_the_masks() {
        let mut register = built(
            Register::with_storage_bits("event", 16)
                .with_field(Field::new("pending", 0x0, 4, AccessKind::WriteSetReadClear))
                .with_field(Field::new("armed", 0xF, 4, AccessKind::WriteClearReadSet))
                .with_field(Field::new("cfg", 0x0, 8, AccessKind::ReadWrite)),
        );
        assert_eq!(register.write_mask(), 0xFF00, "WSRC and WCRS bits are not writable");
        assert_eq!(register.get(), 0x00F0);

        assert_eq!(register.write(0x5A_03), AccessStatus::Okay);
        assert_eq!(register.field_value("pending"), 0xF, "any write sets WSRC bits");
        assert_eq!(register.field_value("armed"), 0x0, "any write clears WCRS bits");
        assert_eq!(register.field_value("cfg"), 0x5A);

        assert_eq!(register.read(), (0x5A_0F, AccessStatus::Okay));
        assert_eq!(
            register.get(),
            0x5A_F0,
            "read clears WSRC bits and sets WCRS bits after sampling"
        );
    }

    #[test]
    fn write_only_register_traps_reads() {
        let mut register =
            built(Register::new("tx").with_field(Field::new("data", 0, 8, AccessKind::WriteOnly)));
        assert_eq!(register.write(0x42), AccessStatus::Okay);
        assert_eq!(register.read(), (0, AccessStatus::Error));
        assert_eq!(register.get(), 0x42, "trapped read must not change state");
    }

    #[test]
    fn backdoor_bypasses_masks_and_hooks() {
        let mut register = built(
            Register::new("status").with_field(Field::new("flags", 0, 8, AccessKind::ReadClear)),
        );
        register.set(0x1_FF);
        assert_eq!(register.get(), 0x1_FF, "set stores the raw value");
        assert_eq!(register.get(), 0x1_FF, "get has no side effects");
    }

    #[test]
    fn set_field_value_only_touches_its_range() {
        let mut register = built(
            Register::new("prio_destination")
                .with_field(Field::new("prio_0", 0, 2, AccessKind::ReadWrite))
                .with_field(Field::new("prio_1", 1, 2, AccessKind::ReadWrite))
                .with_field(Field::new("prio_2", 2, 2, AccessKind::ReadWrite))
                .with_field(Field::new("prio_3", 3, 2, AccessKind::ReadWrite)),
        );
        assert_eq!(register.get(), 0b11_10_01_00);
        register.set_field_value("prio_1", 0b111);
        assert_eq!(register.get(), 0b11_10_11_00, "value is truncated to the field");
    }

    #[test]
    #[should_panic(expected = "already has a field named 'en'")]
    fn duplicate_field_names_are_fatal() {
        let _ = Register::new("dup")
            .with_field(Field::new("en", 0, 1, AccessKind::ReadWrite))
            .with_field(Field::new("en", 0, 1, AccessKind::ReadWrite));
    }

    #[test]
    #[should_panic(expected = "has zero size")]
    fn zero_sized_fields_are_fatal() {
        let _ =
            Register::new("empty").with_field(Field::new("nothing", 0, 0, AccessKind::ReadOnly));
    }

    #[test]
    #[should_panic(expected = "has no field named 'missing'")]
    fn unknown_field_lookup_is_fatal() {
        let register = Register::new("r").with_field(Field::new("f", 0, 1, AccessKind::ReadWrite));
        register.field_value("missing");
    }

    #[test]
    fn over_width_layout_is_rejected() {
        let mut register = Register::with_storage_bits("byte", 8);
        register.add_field(Field::new("low", 0, 6, AccessKind::ReadWrite));
        let err = register
            .try_add_field(Field::new("high", 0, 3, AccessKind::ReadWrite))
            .expect_err("9 bits cannot fit into 8");
        assert_eq!(
            err,
            LayoutError::ExceedsStorage {
                register: "byte".into(),
                bits: 9,
                storage_bits: 8,
            }
        );
        assert_eq!(register.fields().len(), 1, "rejected field is not kept");
    }

    #[test]
    fn oversized_field_is_rejected_without_overflow() {
        let mut register = Register::new("wide");
        register.add_field(Field::new("low", 0, 1, AccessKind::ReadWrite));
        let err = register
            .try_add_field(Field::new("huge", 0, u32::MAX, AccessKind::ReadWrite))
            .expect_err("a field wider than the storage cannot fit");
        assert_eq!(
            err,
            LayoutError::ExceedsStorage {
                register: "wide".into(),
                bits: u32::MAX,
                storage_bits: 64,
            }
        );
        assert_eq!(register.fields().len(), 1, "rejected field is not kept");
    }

    #[test]
    fn custom_hook_can_inject_write_errors() {
        struct Locked;
        impl AccessHook for Locked {
            fn pre_access(&self, _fields: &[Field], event: &AccessEvent) -> AccessStatus {
                match event.direction {
                    Direction::Write => AccessStatus::Error,
                    Direction::Read => AccessStatus::Okay,
                }
            }
        }

        let mut register = built(
            Register::new("lock").with_field(Field::new("key", 0x5, 8, AccessKind::ReadWrite)),
        );
        register.set_hook(Locked);
        assert_eq!(register.write(0xFF), AccessStatus::Error);
        assert_eq!(register.get(), 0x5, "rejected write leaves the value untouched");
        register.clear_hook();
        assert_eq!(register.write(0xFF), AccessStatus::Okay);
        assert_eq!(register.get(), 0xFF);
    }

    #[test]
    fn custom_hook_can_extend_standard_side_effects() {
        struct CountReads;
        impl AccessHook for CountReads {
            fn post_access(&self, fields: &[Field], event: &AccessEvent, value: &mut RegData) {
                standard_post_access(fields, event, value);
                if event.direction == Direction::Read {
                    *value = value.wrapping_add(1) & 0xFF;
                }
            }
        }

        let mut register = built(
            Register::new("reads").with_field(Field::new("count", 0, 8, AccessKind::ReadOnly)),
        );
        register.set_hook(CountReads);
        assert_eq!(register.read(), (0, AccessStatus::Okay));
        assert_eq!(register.read(), (1, AccessStatus::Okay));
        assert!(register.has_custom_hook());
    }

    #[test]
    fn display_lists_every_field() {
        let mut register = Register::new("local_id")
            .with_field(Field::new("local_id", 0, 8, AccessKind::ReadWrite));
        register.build();
        register.set(0xCF);
        let text = register.to_string();
        assert!(text.starts_with("local_id value=0xCF"), "got {text}");
        assert!(text.contains("access=RW"), "field line missing: {text}");
    }
}
