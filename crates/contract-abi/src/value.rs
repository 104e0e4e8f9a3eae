//! Type-erased runtime values mirroring [`AbiType`](crate::types::AbiType).

use crate::primitives::Address;
use num_bigint::{BigInt, BigUint};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiValue {
    Uint(BigUint),
    Int(BigInt),
    Bool(bool),
    Address(Address),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<AbiValue>),
    FixedArray(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn uint(value: u64) -> Self {
        AbiValue::Uint(BigUint::from(value))
    }

    pub fn int(value: i64) -> Self {
        AbiValue::Int(BigInt::from(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        AbiValue::String(value.into())
    }

    /// Short variant name used in mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::Bool(_) => "bool",
            AbiValue::Address(_) => "address",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::FixedArray(_) => "fixed array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    pub fn as_uint(&self) -> Option<&BigUint> {
        match self {
            AbiValue::Uint(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            AbiValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            AbiValue::Address(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Payload of `bytes` and `bytesN` values.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(v) | AbiValue::FixedBytes(v) => Some(v),
            _ => None,
        }
    }

    /// Elements of arrays, fixed arrays and tuples.
    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(v) | AbiValue::FixedArray(v) | AbiValue::Tuple(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Uint(v) => write!(f, "{v}"),
            AbiValue::Int(v) => write!(f, "{v}"),
            AbiValue::Bool(v) => write!(f, "{v}"),
            AbiValue::Address(v) => write!(f, "{v}"),
            AbiValue::FixedBytes(v) | AbiValue::Bytes(v) => write!(f, "0x{}", hex::encode(v)),
            AbiValue::String(v) => write!(f, "{v:?}"),
            AbiValue::Array(v) | AbiValue::FixedArray(v) => write_list(f, v, "[", "]"),
            AbiValue::Tuple(v) => write_list(f, v, "(", ")"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[AbiValue], open: &str, close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested() {
        let value = AbiValue::Tuple(vec![
            AbiValue::uint(7),
            AbiValue::Array(vec![AbiValue::int(-1), AbiValue::int(2)]),
            AbiValue::Bytes(vec![0xab]),
            AbiValue::string("hi"),
        ]);
        assert_eq!(value.to_string(), r#"(7, [-1, 2], 0xab, "hi")"#);
    }
}
