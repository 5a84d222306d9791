//! Pre/post access strategies.
//!
//! A register consults its hook around every front-door access. `StandardHook` reproduces the
//! attribute table of `AccessKind`; custom hooks override either method and can fall back to
//! the `standard_*` functions for the behaviour they do not change.

use super::access::{AccessStatus, Direction};
use super::field::Field;
use super::RegData;

/// Snapshot handed to the hooks for one access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessEvent {
    pub direction: Direction,
    /// Data being written. Always zero for reads.
    pub data: RegData,
    /// Register value before the access touched it.
    pub prior: RegData,
}

impl AccessEvent {
    pub fn read(prior: RegData) -> Self {
        Self {
            direction: Direction::Read,
            data: 0,
            prior,
        }
    }

    pub fn write(data: RegData, prior: RegData) -> Self {
        Self {
            direction: Direction::Write,
            data,
            prior,
        }
    }
}

pub trait AccessHook: Send + Sync {
    /// Decides whether the access may proceed. Anything but `Okay` aborts it untouched.
    fn pre_access(&self, fields: &[Field], event: &AccessEvent) -> AccessStatus {
        standard_pre_access(fields, event)
    }

    /// Applies side effects after the value has been read or written.
    fn post_access(&self, fields: &[Field], event: &AccessEvent, value: &mut RegData) {
        standard_post_access(fields, event, value)
    }
}

/// Attribute-table behaviour used by every register without a custom hook.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardHook;

impl AccessHook for StandardHook {}

pub(crate) static STANDARD_HOOK: StandardHook = StandardHook;

pub fn standard_pre_access(fields: &[Field], event: &AccessEvent) -> AccessStatus {
    let trapped = fields.iter().any(|field| match event.direction {
        Direction::Read => field.access().is_error_on_read(),
        Direction::Write => field.access().is_error_on_write(),
    });
    if trapped {
        AccessStatus::Error
    } else {
        AccessStatus::Okay
    }
}

pub fn standard_post_access(fields: &[Field], event: &AccessEvent, value: &mut RegData) {
    for field in fields {
        let access = field.access();
        match event.direction {
            Direction::Read => {
                if access.is_clear_on_read() {
                    *value = field.insert(*value, 0);
                }
                if access.is_set_on_read() {
                    *value = field.insert(*value, field.mask());
                }
            }
            Direction::Write => {
                if access.is_write_one_clear() {
                    // ones in the written data clear bits of the value held before the write
                    let current = field.extract(event.prior);
                    let ones = field.extract(event.data);
                    *value = field.insert(*value, current & !ones);
                }
                if access.is_clear_on_write() {
                    *value = field.insert(*value, 0);
                }
                if access.is_set_on_write() {
                    *value = field.insert(*value, field.mask());
                }
            }
        }
    }
}
