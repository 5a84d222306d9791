use std::{error::Error, fmt};

pub type LayoutResult<T> = Result<T, LayoutError>;

/// Static modelling mistakes in a register definition.
///
/// The panicking register APIs surface these through their panic message; the `try_` variants
/// hand them back to callers that build registers from runtime input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    ZeroSizeField {
        register: String,
        field: String,
    },
    DuplicateField {
        register: String,
        field: String,
    },
    ExceedsStorage {
        register: String,
        bits: u32,
        storage_bits: u32,
    },
    InvalidStorageWidth {
        register: String,
        bits: u32,
    },
    UnknownField {
        register: String,
        field: String,
    },
    UnknownAccess {
        mnemonic: String,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::ZeroSizeField { register, field } => {
                write!(f, "field '{field}' of register '{register}' has zero size")
            }
            LayoutError::DuplicateField { register, field } => {
                write!(f, "register '{register}' already has a field named '{field}'")
            }
            LayoutError::ExceedsStorage {
                register,
                bits,
                storage_bits,
            } => write!(
                f,
                "register '{register}' needs {bits} bits but its storage holds {storage_bits}"
            ),
            LayoutError::InvalidStorageWidth { register, bits } => write!(
                f,
                "register '{register}' storage width {bits} is outside 1..=64"
            ),
            LayoutError::UnknownField { register, field } => {
                write!(f, "register '{register}' has no field named '{field}'")
            }
            LayoutError::UnknownAccess { mnemonic } => {
                write!(f, "unknown field access attribute '{mnemonic}'")
            }
        }
    }
}

impl Error for LayoutError {}
