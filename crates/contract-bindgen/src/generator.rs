//! Rust source generation for struct and custom-error bindings.
//!
//! Output is plain items with no inner attributes, so it can be pulled in
//! with `include!`. Structs come first sorted by ABI name, then errors
//! sorted by name, then the error enum and the error info table; the same
//! schema and config always give the same text.

use crate::config::BindgenConfig;
use crate::error::GeneratorError;
use crate::naming::{contract_ident, field_idents, type_ident};
use crate::type_mapper::{solidity_label, HostType, TypeMapper};
use contract_abi::{AbiEntry, Schema, Selector};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use tracing::{debug, info};

const BASE_DERIVES: [&str; 4] = ["Debug", "Clone", "PartialEq", "Eq"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Struct,
    Error,
}

/// What was emitted for one struct or error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSummary {
    /// Rust type identifier.
    pub ident: String,
    pub abi_name: String,
    pub kind: BindingKind,
    pub signature: String,
    pub selector: Option<Selector>,
}

#[derive(Debug, Clone)]
pub struct GeneratedBindings {
    /// Contract identifier used in the header and enum name.
    pub contract: String,
    pub source: String,
    pub bindings: Vec<BindingSummary>,
}

impl GeneratedBindings {
    pub fn binding(&self, ident: &str) -> Option<&BindingSummary> {
        self.bindings.iter().find(|b| b.ident == ident)
    }

    pub fn structs(&self) -> impl Iterator<Item = &BindingSummary> {
        self.bindings.iter().filter(|b| b.kind == BindingKind::Struct)
    }

    pub fn errors(&self) -> impl Iterator<Item = &BindingSummary> {
        self.bindings.iter().filter(|b| b.kind == BindingKind::Error)
    }
}

struct Field<'s> {
    ident: String,
    /// Name reported in decode error paths.
    label: String,
    abi_name: &'s str,
    abi_type: &'s contract_abi::AbiType,
    host: HostType,
}

struct Declaration<'s> {
    ident: String,
    kind: BindingKind,
    entry: &'s AbiEntry,
    fields: Vec<Field<'s>>,
}

impl Declaration<'_> {
    fn selector(&self) -> Option<Selector> {
        match self.kind {
            BindingKind::Error => self.entry.selector(),
            BindingKind::Struct => None,
        }
    }

    fn summary(&self) -> BindingSummary {
        BindingSummary {
            ident: self.ident.clone(),
            abi_name: self.entry.name.clone(),
            kind: self.kind,
            signature: self.entry.signature().to_string(),
            selector: self.selector(),
        }
    }
}

/// Generate bindings for every struct and custom error in `schema`.
///
/// A schema with recorded failures is refused: emitting bindings for only
/// the entries that parsed would silently drop types.
pub fn generate(schema: &Schema, config: &BindgenConfig) -> Result<GeneratedBindings, GeneratorError> {
    if let Some(failure) = schema.failures().first() {
        return Err(GeneratorError::from_schema(failure));
    }

    let contract = contract_ident(config.contract_name.as_deref().unwrap_or("Contract"));
    let struct_idents: BTreeMap<String, String> = schema
        .structs()
        .keys()
        .map(|name| (name.clone(), type_ident(name)))
        .collect();

    let mut errors: Vec<&AbiEntry> = schema.custom_errors().collect();
    errors.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.signature().cmp(b.signature())));

    let mut taken = BTreeSet::new();
    let error_idents = errors.iter().map(|e| type_ident(&e.name));
    for ident in struct_idents.values().cloned().chain(error_idents) {
        if !taken.insert(ident.clone()) {
            return Err(GeneratorError::TypeCollision { name: ident });
        }
    }
    let error_enum = (config.error_enum && !errors.is_empty()).then(|| format!("{contract}Errors"));
    if let Some(name) = &error_enum {
        if taken.contains(name) {
            return Err(GeneratorError::TypeCollision { name: name.clone() });
        }
    }

    let mapper = TypeMapper::new(&struct_idents);
    let mut structs = Vec::new();
    for (name, entry) in schema.structs() {
        let ident = struct_idents.get(name).cloned().unwrap_or_else(|| type_ident(name));
        structs.push(declaration(&mapper, ident, BindingKind::Struct, entry)?);
    }
    let mut error_decls = Vec::new();
    for entry in errors {
        error_decls.push(declaration(&mapper, type_ident(&entry.name), BindingKind::Error, entry)?);
    }

    let derives = derive_list(&config.extra_derives);
    let mut out = String::new();
    write_header(&mut out, &contract, &config.runtime_crate, structs.len(), error_decls.len())?;
    for decl in structs.iter().chain(&error_decls) {
        debug!(ident = %decl.ident, signature = decl.entry.signature(), "emitting binding");
        write_declaration(&mut out, decl, &derives, &mapper)?;
    }
    if let Some(name) = &error_enum {
        write_error_enum(&mut out, name, &contract, &error_decls)?;
    }
    if config.error_info {
        write_error_info(&mut out, &contract, &error_decls)?;
    }

    info!(
        contract = %contract,
        structs = structs.len(),
        errors = error_decls.len(),
        "generated bindings"
    );
    Ok(GeneratedBindings {
        bindings: structs.iter().chain(&error_decls).map(Declaration::summary).collect(),
        contract,
        source: out,
    })
}

fn declaration<'s>(
    mapper: &TypeMapper<'_>,
    ident: String,
    kind: BindingKind,
    entry: &'s AbiEntry,
) -> Result<Declaration<'s>, GeneratorError> {
    let idents = field_idents(&entry.name, entry.inputs.iter().map(|p| p.name.as_str()))?;
    let fields = entry
        .inputs
        .iter()
        .zip(idents)
        .enumerate()
        .map(|(index, (param, ident))| {
            Ok(Field {
                ident,
                label: if param.name.is_empty() {
                    index.to_string()
                } else {
                    param.name.clone()
                },
                abi_name: &param.name,
                abi_type: &param.ty,
                host: mapper.host_type(&param.ty, &entry.name)?,
            })
        })
        .collect::<Result<Vec<_>, GeneratorError>>()?;
    Ok(Declaration {
        ident,
        kind,
        entry,
        fields,
    })
}

fn derive_list(extra: &[String]) -> String {
    let mut derives: Vec<&str> = BASE_DERIVES.to_vec();
    for derive in extra {
        let derive = derive.trim();
        if !derive.is_empty() && !derives.contains(&derive) {
            derives.push(derive);
        }
    }
    derives.join(", ")
}

fn write_header(
    out: &mut String,
    contract: &str,
    runtime: &str,
    structs: usize,
    errors: usize,
) -> Result<(), GeneratorError> {
    writeln!(
        out,
        "// DO NOT EDIT. This file was generated by contract-bindgen {}.",
        env!("CARGO_PKG_VERSION")
    )?;
    writeln!(out, "// Contract: {contract} ({structs} structs, {errors} custom errors)")?;
    writeln!(out)?;
    writeln!(out, "#[allow(unused_imports)]")?;
    writeln!(out, "use {runtime}::{{")?;
    writeln!(out, "    num_bigint::{{BigInt, BigUint}},")?;
    writeln!(out, "    AbiError, AbiStruct, AbiType, AbiValue, Address, Bytes, CodecError, ErrorInfo, ErrorParam,")?;
    writeln!(out, "    FixedBytes, FromAbiValue, IntoAbiValue, Param, Selector, TupleReader, TupleType,")?;
    writeln!(out, "}};")?;
    Ok(())
}

fn write_declaration(
    out: &mut String,
    decl: &Declaration<'_>,
    derives: &str,
    mapper: &TypeMapper<'_>,
) -> Result<(), GeneratorError> {
    let name = &decl.ident;
    let abi_name = &decl.entry.name;

    writeln!(out)?;
    match decl.selector() {
        Some(selector) => writeln!(out, "/// Custom error `{}`, selector `{selector}`.", decl.entry.signature())?,
        None => writeln!(out, "/// Struct `{}`.", decl.entry.signature())?,
    }
    writeln!(out, "#[derive({derives})]")?;
    if decl.fields.is_empty() {
        writeln!(out, "pub struct {name};")?;
    } else {
        writeln!(out, "pub struct {name} {{")?;
        for field in &decl.fields {
            if !field.abi_name.is_empty() && field.abi_name != field.ident {
                writeln!(out, "    /// ABI name `{}`", field.abi_name)?;
            }
            writeln!(out, "    pub {}: {},", field.ident, field.host)?;
        }
        writeln!(out, "}}")?;
    }

    writeln!(out)?;
    writeln!(out, "impl IntoAbiValue for {name} {{")?;
    writeln!(out, "    fn to_abi_value(&self) -> AbiValue {{")?;
    if decl.fields.is_empty() {
        writeln!(out, "        AbiValue::Tuple(Vec::new())")?;
    } else {
        writeln!(out, "        AbiValue::Tuple(vec![")?;
        for field in &decl.fields {
            writeln!(out, "            self.{}.to_abi_value(),", field.ident)?;
        }
        writeln!(out, "        ])")?;
    }
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "impl FromAbiValue for {name} {{")?;
    writeln!(out, "    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {{")?;
    if decl.fields.is_empty() {
        writeln!(out, "        TupleReader::new(value, 0)?;")?;
        writeln!(out, "        Ok(Self)")?;
    } else {
        writeln!(out, "        let mut fields = TupleReader::new(value, {})?;", decl.fields.len())?;
        writeln!(out, "        Ok(Self {{")?;
        for field in &decl.fields {
            writeln!(out, "            {}: fields.next({:?})?,", field.ident, field.label)?;
        }
        writeln!(out, "        }})")?;
    }
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "impl AbiStruct for {name} {{")?;
    writeln!(out, "    const NAME: &'static str = {abi_name:?};")?;
    writeln!(out, "    const SIGNATURE: &'static str = {:?};", decl.entry.signature())?;
    writeln!(out)?;
    writeln!(out, "    fn abi_type() -> AbiType {{")?;
    if decl.fields.is_empty() {
        writeln!(out, "        AbiType::Tuple(TupleType::named({abi_name:?}, Vec::new()))")?;
    } else {
        writeln!(out, "        AbiType::Tuple(TupleType::named(")?;
        writeln!(out, "            {abi_name:?},")?;
        writeln!(out, "            vec![")?;
        for field in &decl.fields {
            writeln!(
                out,
                "                Param::new({:?}, {}),",
                field.abi_name,
                mapper.abi_type_expr(field.abi_type)
            )?;
        }
        writeln!(out, "            ],")?;
        writeln!(out, "        ))")?;
    }
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;

    if let Some(selector) = decl.selector() {
        let bytes: Vec<String> = selector.as_bytes().iter().map(|b| format!("0x{b:02x}")).collect();
        writeln!(out)?;
        writeln!(out, "impl AbiError for {name} {{")?;
        writeln!(out, "    const SELECTOR: Selector = Selector::new([{}]);", bytes.join(", "))?;
        writeln!(out, "}}")?;
    }
    Ok(())
}

fn write_error_enum(
    out: &mut String,
    name: &str,
    contract: &str,
    errors: &[Declaration<'_>],
) -> Result<(), GeneratorError> {
    writeln!(out)?;
    writeln!(out, "/// Custom errors of `{contract}`, classified by selector.")?;
    writeln!(out, "#[derive(Debug, Clone, PartialEq, Eq)]")?;
    writeln!(out, "pub enum {name} {{")?;
    for error in errors {
        writeln!(out, "    {0}({0}),", error.ident)?;
    }
    writeln!(out, "}}")?;

    writeln!(out)?;
    writeln!(out, "impl {name} {{")?;
    writeln!(out, "    pub const SELECTORS: &'static [Selector] = &[")?;
    for error in errors {
        writeln!(out, "        <{} as AbiError>::SELECTOR,", error.ident)?;
    }
    writeln!(out, "    ];")?;
    writeln!(out)?;
    writeln!(out, "    /// Decode revert data. Data with an unknown selector yields")?;
    writeln!(out, "    /// `CodecError::UnknownSelector` carrying the raw bytes.")?;
    writeln!(out, "    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {{")?;
    writeln!(
        out,
        "        let selector = Selector::from_prefix(data).ok_or_else(|| CodecError::truncated_selector(data))?;"
    )?;
    for error in errors {
        writeln!(out, "        if selector == <{} as AbiError>::SELECTOR {{", error.ident)?;
        writeln!(
            out,
            "            return {0}::abi_decode_with_selector(data).map(Self::{0});",
            error.ident
        )?;
        writeln!(out, "        }}")?;
    }
    writeln!(out, "        Err(CodecError::UnknownSelector {{")?;
    writeln!(out, "            selector,")?;
    writeln!(out, "            data: data.to_vec(),")?;
    writeln!(out, "        }})")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    pub fn selector(&self) -> Selector {{")?;
    writeln!(out, "        match self {{")?;
    for error in errors {
        writeln!(out, "            Self::{0}(_) => <{0} as AbiError>::SELECTOR,", error.ident)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out)?;
    writeln!(out, "    /// Selector followed by the encoded error payload.")?;
    writeln!(out, "    pub fn abi_encode(&self) -> Result<Vec<u8>, CodecError> {{")?;
    writeln!(out, "        match self {{")?;
    for error in errors {
        writeln!(out, "            Self::{}(error) => error.abi_encode_with_selector(),", error.ident)?;
    }
    writeln!(out, "        }}")?;
    writeln!(out, "    }}")?;
    writeln!(out, "}}")?;
    Ok(())
}

fn write_error_info(out: &mut String, contract: &str, errors: &[Declaration<'_>]) -> Result<(), GeneratorError> {
    writeln!(out)?;
    writeln!(out, "/// Custom error information for `{contract}`.")?;
    if errors.is_empty() {
        writeln!(out, "pub const ERROR_INFO: &[ErrorInfo] = &[];")?;
        return Ok(());
    }
    writeln!(out, "pub const ERROR_INFO: &[ErrorInfo] = &[")?;
    for error in errors {
        let selector = error.selector().map(|s| s.to_string()).unwrap_or_default();
        writeln!(out, "    ErrorInfo {{")?;
        writeln!(out, "        name: {:?},", error.entry.name)?;
        writeln!(out, "        selector: {selector:?},")?;
        writeln!(out, "        signature: {:?},", error.entry.signature())?;
        if error.fields.is_empty() {
            writeln!(out, "        inputs: &[],")?;
        } else {
            writeln!(out, "        inputs: &[")?;
            for field in &error.fields {
                writeln!(
                    out,
                    "            ErrorParam {{ name: {:?}, solidity_type: {:?}, rust_type: {:?} }},",
                    field.abi_name,
                    solidity_label(field.abi_type),
                    field.host.to_string()
                )?;
            }
            writeln!(out, "        ],")?;
        }
        writeln!(out, "    }},")?;
    }
    writeln!(out, "];")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABI: &str = r#"[
        {"type": "function", "name": "getFactoryInfo", "stateMutability": "view",
         "inputs": [{"name": "factory", "type": "address"}],
         "outputs": [{"name": "info", "type": "tuple", "internalType": "struct IRegistry.FactoryInfo",
                      "components": [{"name": "data", "type": "uint256"}, {"name": "name", "type": "string"}]}]},
        {"type": "error", "name": "InsufficientBalance",
         "inputs": [{"name": "available", "type": "uint256"}, {"name": "required", "type": "uint256"}]},
        {"type": "error", "name": "Unauthorized", "inputs": []}
    ]"#;

    fn schema(json: &str) -> Schema {
        Schema::from_json(json).unwrap()
    }

    #[test]
    fn test_declarations_and_order() {
        let config = BindgenConfig::default().with_contract_name("IRegistry");
        let generated = generate(&schema(ABI), &config).unwrap();
        let source = &generated.source;

        assert!(source.starts_with("// DO NOT EDIT."));
        assert!(source.contains("pub struct FactoryInfo {\n    pub data: BigUint,\n    pub name: String,\n}"));
        assert!(source.contains("pub struct Unauthorized;"));
        assert!(source.contains("const SELECTOR: Selector = Selector::new([0xcf, 0x47, 0x91, 0x81]);"));
        assert!(source.contains("pub enum IRegistryErrors {"));

        let factory = source.find("pub struct FactoryInfo").unwrap();
        let balance = source.find("pub struct InsufficientBalance").unwrap();
        let unauthorized = source.find("pub struct Unauthorized").unwrap();
        assert!(factory < balance && balance < unauthorized);

        let summary = generated.binding("InsufficientBalance").unwrap();
        assert_eq!(summary.kind, BindingKind::Error);
        assert_eq!(summary.selector.map(|s| s.to_string()).as_deref(), Some("0xcf479181"));
        assert_eq!(generated.structs().count(), 1);
        assert_eq!(generated.errors().count(), 2);
    }

    #[test]
    fn test_no_inner_attributes() {
        let generated = generate(&schema(ABI), &BindgenConfig::default()).unwrap();
        assert!(!generated.source.contains("#!["));
    }

    #[test]
    fn test_optional_sections() {
        let mut config = BindgenConfig::default();
        config.error_enum = false;
        config.error_info = false;
        config.extra_derives = vec!["Hash".to_string(), "Clone".to_string()];
        let generated = generate(&schema(ABI), &config).unwrap();
        assert!(!generated.source.contains("pub enum"));
        assert!(!generated.source.contains("ERROR_INFO"));
        assert!(generated.source.contains("#[derive(Debug, Clone, PartialEq, Eq, Hash)]"));
    }

    #[test]
    fn test_schema_failure_blocks_generation() {
        let json = r#"[{"type": "error", "name": "Bad", "inputs": [{"name": "x", "type": "uint7"}]}]"#;
        let err = generate(&schema(json), &BindgenConfig::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::Schema { ref entry, .. } if entry == "Bad"));
        assert!(err.to_string().contains("uint7"));
    }

    #[test]
    fn test_struct_error_type_collision() {
        let json = r#"[
            {"type": "error", "name": "Info", "inputs": [
                {"name": "info", "type": "tuple", "internalType": "struct Info",
                 "components": [{"name": "a", "type": "bool"}]}]}
        ]"#;
        let err = generate(&schema(json), &BindgenConfig::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::TypeCollision { ref name } if name == "Info"));
    }

    #[test]
    fn test_renamed_fields_keep_abi_names() {
        let json = r#"[{"type": "error", "name": "Weird", "inputs": [
            {"name": "type", "type": "uint8"}, {"name": "", "type": "bool"}, {"name": "Type", "type": "uint16"}
        ]}]"#;
        let generated = generate(&schema(json), &BindgenConfig::default()).unwrap();
        let source = &generated.source;
        assert!(source.contains("    pub type_: u8,"));
        assert!(source.contains("    pub type_: u8,\n    pub arg1: bool,"));
        assert!(source.contains("    pub type__2: u16,"));
        assert!(source.contains("type_: fields.next(\"type\")?,"));
        assert!(source.contains("arg1: fields.next(\"1\")?,"));
        assert!(source.contains("Param::new(\"Type\", AbiType::Uint(16)),"));
    }
}
