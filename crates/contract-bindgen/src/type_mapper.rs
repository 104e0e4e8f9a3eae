//! Mapping from ABI types to the Rust types used in generated bindings.

use crate::error::GeneratorError;
use crate::naming::type_ident;
use contract_abi::{AbiType, TupleType};
use std::collections::BTreeMap;
use std::fmt;

/// Largest anonymous tuple with a `FromAbiValue`/`IntoAbiValue` impl.
pub const MAX_TUPLE_ARITY: usize = 8;

/// Rust type of a generated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostType {
    Bool,
    /// `u8`, `u16`, `u32` or `u64`
    Unsigned(u16),
    /// `i8`, `i16`, `i32` or `i64`
    Signed(u16),
    BigUint,
    BigInt,
    Address,
    Bytes,
    FixedBytes(usize),
    String,
    Vec(Box<HostType>),
    Array(Box<HostType>, usize),
    Struct(String),
    Tuple(Vec<HostType>),
}

fn native_width(bits: u16) -> Option<u16> {
    [8u16, 16, 32, 64].into_iter().find(|w| bits <= *w)
}

/// Maps ABI types of one schema, knowing the Rust identifiers chosen for its
/// structs.
pub struct TypeMapper<'a> {
    struct_idents: &'a BTreeMap<String, String>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(struct_idents: &'a BTreeMap<String, String>) -> Self {
        Self { struct_idents }
    }

    fn struct_ident(&self, name: &str) -> String {
        self.struct_idents
            .get(name)
            .cloned()
            .unwrap_or_else(|| type_ident(name))
    }

    pub fn host_type(&self, ty: &AbiType, entry: &str) -> Result<HostType, GeneratorError> {
        Ok(match ty {
            AbiType::Bool => HostType::Bool,
            AbiType::Uint(bits) => native_width(*bits).map_or(HostType::BigUint, HostType::Unsigned),
            AbiType::Int(bits) => native_width(*bits).map_or(HostType::BigInt, HostType::Signed),
            AbiType::Address => HostType::Address,
            AbiType::Bytes => HostType::Bytes,
            AbiType::FixedBytes(n) => HostType::FixedBytes(*n),
            AbiType::String => HostType::String,
            AbiType::Array(inner) => HostType::Vec(Box::new(self.host_type(inner, entry)?)),
            AbiType::FixedArray(inner, len) => {
                HostType::Array(Box::new(self.host_type(inner, entry)?), *len)
            }
            AbiType::Tuple(TupleType {
                struct_name: Some(name),
                ..
            }) => HostType::Struct(self.struct_ident(name)),
            AbiType::Tuple(tuple) => {
                if tuple.fields.len() > MAX_TUPLE_ARITY {
                    return Err(GeneratorError::UnsupportedTuple {
                        entry: entry.to_string(),
                        arity: tuple.fields.len(),
                    });
                }
                HostType::Tuple(
                    tuple
                        .fields
                        .iter()
                        .map(|f| self.host_type(&f.ty, entry))
                        .collect::<Result<_, _>>()?,
                )
            }
        })
    }

    /// Rust expression rebuilding `ty` inside generated code.
    pub fn abi_type_expr(&self, ty: &AbiType) -> String {
        match ty {
            AbiType::Uint(bits) => format!("AbiType::Uint({bits})"),
            AbiType::Int(bits) => format!("AbiType::Int({bits})"),
            AbiType::Bool => "AbiType::Bool".to_string(),
            AbiType::Address => "AbiType::Address".to_string(),
            AbiType::FixedBytes(n) => format!("AbiType::FixedBytes({n})"),
            AbiType::Bytes => "AbiType::Bytes".to_string(),
            AbiType::String => "AbiType::String".to_string(),
            AbiType::Array(inner) => format!("AbiType::Array(Box::new({}))", self.abi_type_expr(inner)),
            AbiType::FixedArray(inner, len) => {
                format!("AbiType::FixedArray(Box::new({}), {len})", self.abi_type_expr(inner))
            }
            AbiType::Tuple(TupleType {
                struct_name: Some(name),
                ..
            }) => format!("<{} as AbiStruct>::abi_type()", self.struct_ident(name)),
            AbiType::Tuple(tuple) => {
                let fields: Vec<String> = tuple
                    .fields
                    .iter()
                    .map(|f| format!("Param::new({:?}, {})", f.name, self.abi_type_expr(&f.ty)))
                    .collect();
                format!("AbiType::Tuple(TupleType::new(vec![{}]))", fields.join(", "))
            }
        }
    }
}

/// Solidity-facing label of a type, naming structs where the ABI does.
pub fn solidity_label(ty: &AbiType) -> String {
    match ty {
        AbiType::Array(inner) => format!("{}[]", solidity_label(inner)),
        AbiType::FixedArray(inner, len) => format!("{}[{len}]", solidity_label(inner)),
        AbiType::Tuple(TupleType {
            struct_name: Some(name),
            ..
        }) => name.clone(),
        other => other.canonical(),
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Bool => f.write_str("bool"),
            HostType::Unsigned(bits) => write!(f, "u{bits}"),
            HostType::Signed(bits) => write!(f, "i{bits}"),
            HostType::BigUint => f.write_str("BigUint"),
            HostType::BigInt => f.write_str("BigInt"),
            HostType::Address => f.write_str("Address"),
            HostType::Bytes => f.write_str("Bytes"),
            HostType::FixedBytes(n) => write!(f, "FixedBytes<{n}>"),
            HostType::String => f.write_str("String"),
            HostType::Vec(inner) => write!(f, "Vec<{inner}>"),
            HostType::Array(inner, len) => write!(f, "[{inner}; {len}]"),
            HostType::Struct(name) => f.write_str(name),
            HostType::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}
