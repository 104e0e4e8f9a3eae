//! Type definitions for contract ABI entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::selector::{event_topic, Selector};

/// ABI parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbiType {
    Uint(u16),
    Int(u16),
    Bool,
    Address,
    FixedBytes(usize),
    Bytes,
    String,
    Array(Box<AbiType>),
    FixedArray(Box<AbiType>, usize),
    Tuple(TupleType),
}

/// Ordered tuple components. `struct_name` comes from the JSON
/// `internalType` and never takes part in signatures or the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TupleType {
    pub struct_name: Option<String>,
    pub fields: Vec<Param>,
}

impl TupleType {
    pub fn new(fields: Vec<Param>) -> Self {
        Self {
            struct_name: None,
            fields,
        }
    }

    pub fn named(name: impl Into<String>, fields: Vec<Param>) -> Self {
        Self {
            struct_name: Some(name.into()),
            fields,
        }
    }

    pub fn canonical(&self) -> String {
        let inner: Vec<String> = self.fields.iter().map(|f| f.ty.canonical()).collect();
        format!("({})", inner.join(","))
    }
}

/// A named, typed parameter. `indexed` is only meaningful for event inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: AbiType,
    #[serde(default)]
    pub indexed: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
        }
    }

    pub fn indexed(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: true,
        }
    }
}

impl AbiType {
    /// Parse a JSON ABI `type` string such as `uint256`, `bytes32[]` or
    /// `tuple[2]`. `tuple` bases take their components from `tuple`; a
    /// parenthesised canonical form like `(uint256,string)[]` is also
    /// accepted, with unnamed fields.
    pub fn parse(type_str: &str, tuple: Option<TupleType>) -> Result<Self, SchemaError> {
        let unsupported = || SchemaError::UnsupportedType {
            entry: String::new(),
            type_str: type_str.to_string(),
        };
        let trimmed = type_str.trim();

        let (base_end, mut ty) = if trimmed.starts_with('(') {
            let close = matching_paren(trimmed).ok_or_else(unsupported)?;
            let fields = split_top_level(&trimmed[1..close])
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(|part| AbiType::parse(part, None).map(|ty| Param::new("", ty)))
                .collect::<Result<Vec<_>, _>>()?;
            (close + 1, AbiType::Tuple(TupleType::new(fields)))
        } else {
            let base_end = trimmed.find('[').unwrap_or(trimmed.len());
            let base = &trimmed[..base_end];
            let ty = if base == "tuple" {
                match tuple {
                    Some(tuple) => AbiType::Tuple(tuple),
                    None => {
                        return Err(SchemaError::MissingComponents {
                            entry: String::new(),
                            param: String::new(),
                            type_str: type_str.to_string(),
                        })
                    }
                }
            } else {
                Self::parse_elementary(base).ok_or_else(unsupported)?
            };
            (base_end, ty)
        };

        let mut rest = &trimmed[base_end..];
        while !rest.is_empty() {
            let close = rest.find(']').ok_or_else(unsupported)?;
            if !rest.starts_with('[') {
                return Err(unsupported());
            }
            let size = &rest[1..close];
            ty = if size.is_empty() {
                AbiType::Array(Box::new(ty))
            } else {
                let len: usize = size.parse().map_err(|_| unsupported())?;
                if len == 0 {
                    return Err(unsupported());
                }
                AbiType::FixedArray(Box::new(ty), len)
            };
            rest = &rest[close + 1..];
        }
        Ok(ty)
    }

    fn parse_elementary(base: &str) -> Option<Self> {
        match base {
            "bool" => return Some(AbiType::Bool),
            "address" => return Some(AbiType::Address),
            "string" => return Some(AbiType::String),
            "bytes" => return Some(AbiType::Bytes),
            "uint" => return Some(AbiType::Uint(256)),
            "int" => return Some(AbiType::Int(256)),
            // external function pointer: address followed by a selector
            "function" => return Some(AbiType::FixedBytes(24)),
            _ => {}
        }
        if let Some(bits) = base.strip_prefix("uint") {
            return parse_bits(bits).map(AbiType::Uint);
        }
        if let Some(bits) = base.strip_prefix("int") {
            return parse_bits(bits).map(AbiType::Int);
        }
        if let Some(size) = base.strip_prefix("bytes") {
            let n: usize = parse_digits(size)?;
            return (1..=32).contains(&n).then_some(AbiType::FixedBytes(n));
        }
        None
    }

    /// Canonical form used in signatures: `uint256`, `bytes32[]`,
    /// `(uint256,string)[2]`.
    pub fn canonical(&self) -> String {
        match self {
            AbiType::Uint(bits) => format!("uint{bits}"),
            AbiType::Int(bits) => format!("int{bits}"),
            AbiType::Bool => "bool".to_string(),
            AbiType::Address => "address".to_string(),
            AbiType::FixedBytes(n) => format!("bytes{n}"),
            AbiType::Bytes => "bytes".to_string(),
            AbiType::String => "string".to_string(),
            AbiType::Array(inner) => format!("{}[]", inner.canonical()),
            AbiType::FixedArray(inner, len) => format!("{}[{len}]", inner.canonical()),
            AbiType::Tuple(tuple) => tuple.canonical(),
        }
    }

    /// Whether the encoding needs an offset indirection.
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(tuple) => tuple.fields.iter().any(|f| f.ty.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of an enclosing tuple or array:
    /// one word for dynamic types, the full inline size for static ones.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return 32;
        }
        match self {
            AbiType::FixedArray(inner, len) => inner.head_size().saturating_mul(*len),
            AbiType::Tuple(tuple) => tuple
                .fields
                .iter()
                .fold(0usize, |acc, f| acc.saturating_add(f.ty.head_size())),
            _ => 32,
        }
    }

    /// Struct name of a (possibly array-wrapped) tuple.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            AbiType::Tuple(tuple) => tuple.struct_name.as_deref(),
            AbiType::Array(inner) | AbiType::FixedArray(inner, _) => inner.struct_name(),
            _ => None,
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for AbiType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AbiType::parse(s, None)
    }
}

fn parse_digits(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

/// Integer widths the ABI allows: multiples of 8 from 8 to 256.
pub(crate) fn valid_bits(bits: u16) -> bool {
    bits % 8 == 0 && (8..=256).contains(&bits)
}

fn parse_bits(s: &str) -> Option<u16> {
    let bits = u16::try_from(parse_digits(s)?).ok()?;
    valid_bits(bits).then_some(bits)
}

fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

impl StateMutability {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pure" => Some(StateMutability::Pure),
            "view" => Some(StateMutability::View),
            "nonpayable" => Some(StateMutability::NonPayable),
            "payable" => Some(StateMutability::Payable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    Function {
        outputs: Vec<Param>,
        state_mutability: StateMutability,
    },
    Constructor {
        state_mutability: StateMutability,
    },
    Event {
        anonymous: bool,
    },
    Error,
    Struct,
}

/// One ABI entry with its canonical signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEntry {
    pub name: String,
    pub kind: EntryKind,
    pub inputs: Vec<Param>,
    signature: String,
}

impl AbiEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind, inputs: Vec<Param>) -> Self {
        let name = name.into();
        let types: Vec<String> = inputs.iter().map(|p| p.ty.canonical()).collect();
        let prefix = match kind {
            EntryKind::Constructor { .. } => "constructor",
            _ => name.as_str(),
        };
        let signature = format!("{}({})", prefix, types.join(","));
        Self {
            name,
            kind,
            inputs,
            signature,
        }
    }

    pub fn function(name: impl Into<String>, inputs: Vec<Param>, outputs: Vec<Param>) -> Self {
        Self::new(
            name,
            EntryKind::Function {
                outputs,
                state_mutability: StateMutability::NonPayable,
            },
            inputs,
        )
    }

    pub fn error(name: impl Into<String>, inputs: Vec<Param>) -> Self {
        Self::new(name, EntryKind::Error, inputs)
    }

    pub fn event(name: impl Into<String>, inputs: Vec<Param>, anonymous: bool) -> Self {
        Self::new(name, EntryKind::Event { anonymous }, inputs)
    }

    /// `name(type1,type2,...)`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Selector for functions and errors.
    pub fn selector(&self) -> Option<Selector> {
        match self.kind {
            EntryKind::Function { .. } | EntryKind::Error => {
                Some(Selector::from_signature(&self.signature))
            }
            _ => None,
        }
    }

    /// Topic 0 for non-anonymous events.
    pub fn topic(&self) -> Option<[u8; 32]> {
        match self.kind {
            EntryKind::Event { anonymous: false } => Some(event_topic(&self.signature)),
            _ => None,
        }
    }

    pub fn outputs(&self) -> &[Param] {
        match &self.kind {
            EntryKind::Function { outputs, .. } => outputs,
            _ => &[],
        }
    }

    /// The inputs as one tuple type, the layout of calldata arguments and of
    /// error payloads after the selector.
    pub fn input_tuple(&self) -> AbiType {
        AbiType::Tuple(TupleType::new(self.inputs.clone()))
    }

    pub fn output_tuple(&self) -> AbiType {
        AbiType::Tuple(TupleType::new(self.outputs().to_vec()))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, EntryKind::Function { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, EntryKind::Error)
    }

    pub fn is_event(&self) -> bool {
        matches!(self.kind, EntryKind::Event { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elementary_types() {
        assert_eq!("uint256".parse::<AbiType>().unwrap(), AbiType::Uint(256));
        assert_eq!("uint".parse::<AbiType>().unwrap(), AbiType::Uint(256));
        assert_eq!("int8".parse::<AbiType>().unwrap(), AbiType::Int(8));
        assert_eq!("bytes32".parse::<AbiType>().unwrap(), AbiType::FixedBytes(32));
        assert_eq!("bytes".parse::<AbiType>().unwrap(), AbiType::Bytes);
        assert_eq!("function".parse::<AbiType>().unwrap(), AbiType::FixedBytes(24));
    }

    #[test]
    fn test_parse_rejects_invalid_widths() {
        for bad in ["uint7", "uint264", "uint0", "int08", "bytes0", "bytes33", "fixed128x18", "uint256[0]", "uint256[", "tuple"] {
            assert!(bad.parse::<AbiType>().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_array_suffixes_apply_left_to_right() {
        let ty: AbiType = "uint8[2][]".parse().unwrap();
        assert_eq!(
            ty,
            AbiType::Array(Box::new(AbiType::FixedArray(Box::new(AbiType::Uint(8)), 2)))
        );
        assert_eq!(ty.canonical(), "uint8[2][]");
        assert!(ty.is_dynamic());
    }

    #[test]
    fn test_parse_parenthesised_tuple() {
        let ty: AbiType = "(uint256,(bool,string))[3]".parse().unwrap();
        assert_eq!(ty.canonical(), "(uint256,(bool,string))[3]");
        assert!(ty.is_dynamic());
        assert_eq!(ty.head_size(), 32);
    }

    #[test]
    fn test_head_sizes() {
        let ty: AbiType = "(uint256,address[2])".parse().unwrap();
        assert!(!ty.is_dynamic());
        assert_eq!(ty.head_size(), 96);
        assert_eq!("bytes".parse::<AbiType>().unwrap().head_size(), 32);
    }

    #[test]
    fn test_signature_and_selector() {
        let entry = AbiEntry::function(
            "transfer",
            vec![
                Param::new("to", AbiType::Address),
                Param::new("amount", AbiType::Uint(256)),
            ],
            vec![Param::new("", AbiType::Bool)],
        );
        assert_eq!(entry.signature(), "transfer(address,uint256)");
        assert_eq!(entry.selector().unwrap().to_string(), "0xa9059cbb");
        assert!(entry.topic().is_none());
    }

    #[test]
    fn test_nested_tuple_signature() {
        let info = TupleType::named(
            "FactoryInfo",
            vec![
                Param::new("data", AbiType::Uint(256)),
                Param::new("name", AbiType::String),
                Param::new("version", AbiType::String),
            ],
        );
        let entry = AbiEntry::error(
            "BadFactories",
            vec![Param::new("infos", AbiType::Array(Box::new(AbiType::Tuple(info))))],
        );
        assert_eq!(entry.signature(), "BadFactories((uint256,string,string)[])");
        assert_eq!(entry.inputs[0].ty.struct_name(), Some("FactoryInfo"));
    }
}
