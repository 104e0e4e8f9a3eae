//! ABI JSON parser.
//!
//! Reads the contract-ABI JSON produced by Solidity/Vyper toolchains into
//! [`AbiEntry`] values. Each entry is parsed on its own so that one broken
//! entry is reported without discarding the rest of the file.

use crate::error::SchemaError;
use crate::types::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAbiEntry {
    #[serde(rename = "type", default = "default_entry_type")]
    pub entry_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<RawParam>,
    #[serde(default)]
    pub outputs: Vec<RawParam>,
    #[serde(rename = "stateMutability", skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

fn default_entry_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "internalType", skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<RawParam>>,
    #[serde(default)]
    pub indexed: bool,
}

/// Entries that parsed cleanly plus the per-entry failures.
#[derive(Debug, Clone, Default)]
pub struct ParsedAbi {
    pub entries: Vec<AbiEntry>,
    pub failures: Vec<SchemaError>,
}

/// Parse ABI JSON text: either a bare array of entries or a compiler
/// artifact object carrying an `abi` array.
pub fn parse_abi_entries(json: &str) -> Result<ParsedAbi, SchemaError> {
    let root: serde_json::Value =
        serde_json::from_str(json).map_err(|e| SchemaError::Json(e.to_string()))?;
    let items = match root {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut object) => match object.remove("abi") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(SchemaError::Json(
                    "expected an array of entries or an object with an `abi` array".to_string(),
                ))
            }
        },
        _ => {
            return Err(SchemaError::Json(
                "expected an array of ABI entries".to_string(),
            ))
        }
    };

    let mut parsed = ParsedAbi::default();
    for (index, item) in items.into_iter().enumerate() {
        let label = entry_label(&item, index);
        let raw: RawAbiEntry = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(entry = %label, error = %e, "skipping undecodable ABI entry");
                parsed.failures.push(SchemaError::InvalidEntry {
                    entry: label,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        match parse_entry(&raw) {
            Ok(Some(entry)) => {
                debug!(signature = entry.signature(), "parsed ABI entry");
                parsed.entries.push(entry);
            }
            Ok(None) => debug!(entry_type = %raw.entry_type, "ignoring parameterless entry"),
            Err(e) => {
                let e = e.in_entry(&label);
                warn!(error = %e, "skipping invalid ABI entry");
                parsed.failures.push(e);
            }
        }
    }
    Ok(parsed)
}

fn entry_label(item: &serde_json::Value, index: usize) -> String {
    match item.get("name").and_then(|n| n.as_str()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => match item.get("type").and_then(|t| t.as_str()) {
            Some(kind @ ("constructor" | "fallback" | "receive")) => kind.to_string(),
            _ => format!("#{index}"),
        },
    }
}

/// Parse one raw entry. `fallback` and `receive` carry no parameters and
/// yield `None`.
pub fn parse_entry(raw: &RawAbiEntry) -> Result<Option<AbiEntry>, SchemaError> {
    let kind = match raw.entry_type.as_str() {
        "function" => EntryKind::Function {
            outputs: parse_params(&raw.outputs)?,
            state_mutability: parse_mutability(raw)?,
        },
        "constructor" => EntryKind::Constructor {
            state_mutability: parse_mutability(raw)?,
        },
        "event" => EntryKind::Event {
            anonymous: raw.anonymous,
        },
        "error" => EntryKind::Error,
        "fallback" | "receive" => return Ok(None),
        other => {
            return Err(SchemaError::InvalidEntry {
                entry: raw.name.clone(),
                reason: format!("unknown entry type `{other}`"),
            })
        }
    };

    let name = match kind {
        EntryKind::Constructor { .. } => "constructor".to_string(),
        _ if raw.name.is_empty() => {
            return Err(SchemaError::InvalidEntry {
                entry: String::new(),
                reason: format!("{} entry has no name", raw.entry_type),
            })
        }
        _ => raw.name.clone(),
    };

    let inputs = parse_params(&raw.inputs).map_err(|e| e.in_entry(&name))?;
    Ok(Some(AbiEntry::new(name, kind, inputs)))
}

fn parse_mutability(raw: &RawAbiEntry) -> Result<StateMutability, SchemaError> {
    if let Some(value) = &raw.state_mutability {
        return StateMutability::from_str(value).ok_or_else(|| SchemaError::InvalidEntry {
            entry: raw.name.clone(),
            reason: format!("unknown state mutability `{value}`"),
        });
    }
    // pre-0.4.16 compilers only emit `constant` / `payable`
    Ok(match (raw.constant, raw.payable) {
        (Some(true), _) => StateMutability::View,
        (_, Some(true)) => StateMutability::Payable,
        _ => StateMutability::NonPayable,
    })
}

fn parse_params(raw: &[RawParam]) -> Result<Vec<Param>, SchemaError> {
    raw.iter().map(parse_param).collect()
}

/// Parse a parameter, recursing into tuple components.
pub fn parse_param(raw: &RawParam) -> Result<Param, SchemaError> {
    let is_tuple = raw.type_name.trim_start().starts_with("tuple");
    let tuple = match (&raw.components, is_tuple) {
        (Some(components), true) => {
            if components.is_empty() {
                return Err(SchemaError::InvalidEntry {
                    entry: String::new(),
                    reason: format!("parameter `{}` is an empty tuple", raw.name),
                });
            }
            Some(TupleType {
                struct_name: raw.internal_type.as_deref().and_then(struct_name_from_internal),
                fields: parse_params(components)?,
            })
        }
        (None, true) => {
            return Err(SchemaError::MissingComponents {
                entry: String::new(),
                param: raw.name.clone(),
                type_str: raw.type_name.clone(),
            })
        }
        (_, false) => None,
    };

    let ty = AbiType::parse(&raw.type_name, tuple)?;
    Ok(Param {
        name: raw.name.clone(),
        ty,
        indexed: raw.indexed,
    })
}

/// `struct IRegistry.FactoryInfo[]` -> `FactoryInfo`
fn struct_name_from_internal(internal: &str) -> Option<String> {
    let rest = internal.trim().strip_prefix("struct ")?;
    let path = rest.split('[').next().unwrap_or(rest).trim();
    let name = path.rsplit('.').next().unwrap_or(path);
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_name_from_internal() {
        assert_eq!(
            struct_name_from_internal("struct IRegistry.FactoryInfo[]").as_deref(),
            Some("FactoryInfo")
        );
        assert_eq!(struct_name_from_internal("struct Plain").as_deref(), Some("Plain"));
        assert_eq!(struct_name_from_internal("uint256"), None);
    }

    #[test]
    fn test_parse_tuple_param() {
        let raw: RawParam = serde_json::from_str(
            r#"{
                "name": "info",
                "type": "tuple[]",
                "internalType": "struct IRegistry.FactoryInfo[]",
                "components": [
                    {"name": "data", "type": "uint256", "internalType": "uint256"},
                    {"name": "name", "type": "string", "internalType": "string"}
                ]
            }"#,
        )
        .unwrap();
        let param = parse_param(&raw).unwrap();
        assert_eq!(param.ty.canonical(), "(uint256,string)[]");
        assert_eq!(param.ty.struct_name(), Some("FactoryInfo"));
    }

    #[test]
    fn test_missing_components_names_param() {
        let raw: RawParam =
            serde_json::from_str(r#"{"name": "info", "type": "tuple"}"#).unwrap();
        let err = parse_param(&raw).unwrap_err();
        assert!(matches!(err, SchemaError::MissingComponents { ref param, .. } if param == "info"));
    }

    #[test]
    fn test_bad_entries_do_not_abort() {
        let json = r#"[
            {"type": "function", "name": "good", "inputs": [{"name": "a", "type": "uint256"}], "outputs": []},
            {"type": "function", "name": "bad", "inputs": [{"name": "a", "type": "uint7"}], "outputs": []},
            {"type": "error", "name": "Oops", "inputs": [{"name": "x", "type": "tuple"}]},
            {"type": "receive", "stateMutability": "payable"},
            {"type": "event", "name": "Ping", "inputs": [], "anonymous": false}
        ]"#;
        let parsed = parse_abi_entries(json).unwrap();
        let names: Vec<_> = parsed.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["good", "Ping"]);
        assert_eq!(parsed.failures.len(), 2);
        assert_eq!(
            parsed.failures[0],
            SchemaError::UnsupportedType {
                entry: "bad".to_string(),
                type_str: "uint7".to_string()
            }
        );
        assert_eq!(parsed.failures[1].entry(), Some("Oops"));
    }

    #[test]
    fn test_artifact_object_and_legacy_flags() {
        let json = r#"{"contractName": "Old", "abi": [
            {"constant": true, "name": "total", "inputs": [], "outputs": [{"name": "", "type": "uint256"}]}
        ]}"#;
        let parsed = parse_abi_entries(json).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert!(matches!(
            parsed.entries[0].kind,
            EntryKind::Function {
                state_mutability: StateMutability::View,
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_non_array_json() {
        assert!(matches!(parse_abi_entries("42"), Err(SchemaError::Json(_))));
        assert!(matches!(parse_abi_entries("[1,"), Err(SchemaError::Json(_))));
    }
}
