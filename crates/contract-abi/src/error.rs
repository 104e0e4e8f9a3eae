use crate::selector::Selector;
use thiserror::Error;

/// Path reported for failures at the top of the type tree.
pub(crate) const ROOT_PATH: &str = "<root>";

/// Problems found while building the schema model from ABI JSON.
///
/// Every variant except [`SchemaError::Json`] is scoped to a single entry;
/// the parser records them and keeps going with the remaining entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid ABI JSON: {0}")]
    Json(String),

    #[error("entry `{entry}`: unsupported type `{type_str}`")]
    UnsupportedType { entry: String, type_str: String },

    #[error("entry `{entry}`: parameter `{param}` has type `{type_str}` but no components")]
    MissingComponents {
        entry: String,
        param: String,
        type_str: String,
    },

    #[error("entry `{entry}`: {reason}")]
    InvalidEntry { entry: String, reason: String },

    #[error("struct `{name}` is declared with conflicting layouts `{first}` and `{second}`")]
    ConflictingStruct {
        name: String,
        first: String,
        second: String,
    },
}

impl SchemaError {
    /// Name of the ABI entry the error belongs to, if any.
    pub fn entry(&self) -> Option<&str> {
        match self {
            SchemaError::Json(_) => None,
            SchemaError::UnsupportedType { entry, .. }
            | SchemaError::MissingComponents { entry, .. }
            | SchemaError::InvalidEntry { entry, .. } => Some(entry),
            SchemaError::ConflictingStruct { name, .. } => Some(name),
        }
    }

    /// Attach the owning entry name to an error raised below entry level.
    pub(crate) fn in_entry(self, name: &str) -> Self {
        match self {
            SchemaError::UnsupportedType { entry, type_str } if entry.is_empty() => {
                SchemaError::UnsupportedType {
                    entry: name.to_string(),
                    type_str,
                }
            }
            SchemaError::MissingComponents {
                entry,
                param,
                type_str,
            } if entry.is_empty() => SchemaError::MissingComponents {
                entry: name.to_string(),
                param,
                type_str,
            },
            SchemaError::InvalidEntry { entry, reason } if entry.is_empty() => {
                SchemaError::InvalidEntry {
                    entry: name.to_string(),
                    reason,
                }
            }
            other => other,
        }
    }
}

/// Failures of the binary codec and of host-type conversions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed data at `{path}` (offset {offset}): {reason}")]
    Malformed {
        path: String,
        offset: usize,
        reason: String,
    },

    #[error("unrecognized selector {selector} in {} bytes of data", .data.len())]
    UnknownSelector { selector: Selector, data: Vec<u8> },

    #[error("no event matches topic 0x{topic}")]
    UnknownTopic { topic: String },

    #[error("type mismatch at `{path}`: expected {expected}")]
    TypeMismatch { path: String, expected: String },

    #[error("value at `{path}` does not fit in {bits} bits")]
    OutOfRange { path: String, bits: u16 },

    #[error("no function named `{0}`")]
    UnknownFunction(String),
}

impl CodecError {
    pub(crate) fn malformed(path: String, offset: usize, reason: impl Into<String>) -> Self {
        CodecError::Malformed {
            path,
            offset,
            reason: reason.into(),
        }
    }

    /// Error for a buffer that cannot even hold a 4-byte selector.
    pub fn truncated_selector(data: &[u8]) -> Self {
        CodecError::Malformed {
            path: "selector".to_string(),
            offset: 0,
            reason: format!("need 4 bytes for a selector, got {}", data.len()),
        }
    }

    /// Raw bytes carried by an unrecognized selector, for logging or fallback
    /// handling by the caller.
    pub fn raw_data(&self) -> Option<&[u8]> {
        match self {
            CodecError::UnknownSelector { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_unknown_selector(&self) -> bool {
        matches!(self, CodecError::UnknownSelector { .. })
    }

    /// Prefix the error path with an enclosing field name or index segment.
    pub fn within(self, segment: &str) -> Self {
        let join = |path: String| {
            if path.is_empty() || path == ROOT_PATH {
                segment.to_string()
            } else if path.starts_with('[') {
                format!("{segment}{path}")
            } else {
                format!("{segment}.{path}")
            }
        };
        match self {
            CodecError::Malformed {
                path,
                offset,
                reason,
            } => CodecError::Malformed {
                path: join(path),
                offset,
                reason,
            },
            CodecError::TypeMismatch { path, expected } => CodecError::TypeMismatch {
                path: join(path),
                expected,
            },
            CodecError::OutOfRange { path, bits } => CodecError::OutOfRange {
                path: join(path),
                bits,
            },
            other => other,
        }
    }
}
