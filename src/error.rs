use std::{error::Error, fmt};

use crate::reg::LayoutError;

pub type ModelResult<T> = Result<T, ModelError>;

/// Failures while assembling a model, either through the API or from a layout description.
#[derive(Debug)]
pub enum ModelError {
    Io(std::io::Error),
    Config(toml::de::Error),
    Layout(LayoutError),
    DuplicateName {
        block: String,
        kind: &'static str,
        name: String,
    },
    UnknownRegister {
        map: String,
        register: String,
    },
    UnknownMap {
        map: String,
        submap: String,
    },
    OffsetInUse {
        map: String,
        offset: u64,
    },
    MapCycle {
        parent: String,
        child: String,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Io(err) => write!(f, "I/O error: {err}"),
            ModelError::Config(err) => write!(f, "layout description error: {err}"),
            ModelError::Layout(err) => write!(f, "{err}"),
            ModelError::DuplicateName { block, kind, name } => {
                write!(f, "block '{block}' already has a {kind} named '{name}'")
            }
            ModelError::UnknownRegister { map, register } => {
                write!(f, "map '{map}' places unknown register '{register}'")
            }
            ModelError::UnknownMap { map, submap } => {
                write!(f, "map '{map}' places unknown sub-map '{submap}'")
            }
            ModelError::OffsetInUse { map, offset } => {
                write!(f, "map '{map}' already uses offset 0x{offset:X}")
            }
            ModelError::MapCycle { parent, child } => write!(
                f,
                "linking map '{child}' under '{parent}' would create a cycle"
            ),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelError::Io(err) => Some(err),
            ModelError::Config(err) => Some(err),
            ModelError::Layout(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        ModelError::Io(err)
    }
}

impl From<toml::de::Error> for ModelError {
    fn from(err: toml::de::Error) -> Self {
        ModelError::Config(err)
    }
}

impl From<LayoutError> for ModelError {
    fn from(err: LayoutError) -> Self {
        ModelError::Layout(err)
    }
}
