//! The loaded schema model.
//!
//! A [`Schema`] is built once from ABI JSON and is read-only afterwards; it
//! owns the selector and topic indexes and the struct definitions collected
//! from tuple parameters, and routes calldata, returndata, revert data and
//! logs through the codec.

use crate::codec;
use crate::error::{CodecError, SchemaError};
use crate::parser::{parse_abi_entries, ParsedAbi};
use crate::selector::Selector;
use crate::types::{AbiEntry, AbiType, EntryKind, Param};
use crate::value::AbiValue;
use num_bigint::BigUint;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Schema {
    entries: Vec<AbiEntry>,
    structs: BTreeMap<String, AbiEntry>,
    failures: Vec<SchemaError>,
    selectors: HashMap<Selector, usize>,
    topics: HashMap<[u8; 32], usize>,
}

/// Values decoded against the parameter list of one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<'a> {
    pub entry: &'a AbiEntry,
    pub params: &'a [Param],
    pub values: Vec<AbiValue>,
}

impl<'a> Decoded<'a> {
    /// Value of the first parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&AbiValue> {
        let index = self.params.iter().position(|p| p.name == name)?;
        self.values.get(index)
    }
}

/// A decoded event. Indexed parameters of dynamic or compound type only
/// exist in the log as their Keccak-256 hash and are surfaced as a
/// [`AbiValue::FixedBytes`] of 32 bytes.
pub type DecodedLog<'a> = Decoded<'a>;

/// Classified revert data.
#[derive(Debug, Clone, PartialEq)]
pub enum Revert<'a> {
    /// `Error(string)` from `require`/`revert` with a message.
    Message(String),
    /// `Panic(uint256)` with the panic code.
    Panic(BigUint),
    /// A custom error declared in the ABI.
    Custom(Decoded<'a>),
}

impl Revert<'_> {
    /// Description of a Solidity panic code.
    pub fn panic_reason(code: &BigUint) -> Option<&'static str> {
        let code = u8::try_from(code).ok()?;
        Some(match code {
            0x00 => "generic compiler panic",
            0x01 => "assertion failed",
            0x11 => "arithmetic overflow or underflow",
            0x12 => "division or modulo by zero",
            0x21 => "invalid enum value",
            0x22 => "corrupted storage byte array",
            0x31 => "pop on empty array",
            0x32 => "array index out of bounds",
            0x41 => "out of memory",
            0x51 => "call to zero-initialized function",
            _ => return None,
        })
    }
}

impl Schema {
    /// Parse ABI JSON. Only unreadable JSON fails outright; broken entries
    /// are kept in [`Schema::failures`].
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let ParsedAbi { entries, failures } = parse_abi_entries(json)?;
        let mut schema = Self::from_entries(entries);
        let conflicts = std::mem::replace(&mut schema.failures, failures);
        schema.failures.extend(conflicts);
        info!(
            entries = schema.entries.len(),
            structs = schema.structs.len(),
            failures = schema.failures.len(),
            "loaded ABI schema"
        );
        Ok(schema)
    }

    pub fn from_entries(entries: Vec<AbiEntry>) -> Self {
        let mut schema = Schema {
            entries,
            structs: BTreeMap::new(),
            failures: Vec::new(),
            selectors: HashMap::new(),
            topics: HashMap::new(),
        };
        schema.index();
        schema
    }

    fn index(&mut self) {
        let mut structs = BTreeMap::new();
        let mut failures = Vec::new();
        for (position, entry) in self.entries.iter().enumerate() {
            for param in entry.inputs.iter().chain(entry.outputs()) {
                collect_structs(&param.ty, &mut structs, &mut failures);
            }

            if let Some(selector) = entry.selector() {
                if let Some(&first) = self.selectors.get(&selector) {
                    warn!(
                        %selector,
                        kept = self.entries[first].signature(),
                        ignored = entry.signature(),
                        "selector collision"
                    );
                } else {
                    self.selectors.insert(selector, position);
                }
            }
            if let Some(topic) = entry.topic() {
                self.topics.entry(topic).or_insert(position);
            }
        }
        self.structs = structs;
        self.failures.extend(failures);
    }

    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiEntry> {
        self.entries.iter().filter(|e| e.is_function())
    }

    pub fn events(&self) -> impl Iterator<Item = &AbiEntry> {
        self.entries.iter().filter(|e| e.is_event())
    }

    pub fn custom_errors(&self) -> impl Iterator<Item = &AbiEntry> {
        self.entries.iter().filter(|e| e.is_error())
    }

    /// Struct definitions keyed by name.
    pub fn structs(&self) -> &BTreeMap<String, AbiEntry> {
        &self.structs
    }

    /// Per-entry parse failures and struct layout conflicts.
    pub fn failures(&self) -> &[SchemaError] {
        &self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Function by name, or by full signature for overloads
    /// (`transfer(address,uint256)`).
    pub fn function(&self, name: &str) -> Option<&AbiEntry> {
        find_named(self.functions(), name)
    }

    pub fn custom_error(&self, name: &str) -> Option<&AbiEntry> {
        find_named(self.custom_errors(), name)
    }

    pub fn entry_by_selector(&self, selector: Selector) -> Option<&AbiEntry> {
        self.selectors.get(&selector).map(|&i| &self.entries[i])
    }

    pub fn event_by_topic(&self, topic: &[u8; 32]) -> Option<&AbiEntry> {
        self.topics.get(topic).map(|&i| &self.entries[i])
    }

    /// Match the leading selector of `data` to a function or error entry.
    pub fn classify(&self, data: &[u8]) -> Result<&AbiEntry, CodecError> {
        let selector = Selector::from_prefix(data).ok_or_else(|| CodecError::truncated_selector(data))?;
        self.entry_by_selector(selector).ok_or_else(|| {
            debug!(%selector, "unrecognized selector");
            CodecError::UnknownSelector {
                selector,
                data: data.to_vec(),
            }
        })
    }

    /// Selector followed by the encoded arguments.
    pub fn encode_call(&self, name: &str, args: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
        let function = self
            .function(name)
            .ok_or_else(|| CodecError::UnknownFunction(name.to_string()))?;
        let selector = function.selector().ok_or_else(|| CodecError::UnknownFunction(name.to_string()))?;
        let mut out = selector.to_bytes().to_vec();
        out.extend(codec::encode_params(&function.inputs, args)?);
        Ok(out)
    }

    pub fn decode_call<'a>(&'a self, data: &[u8]) -> Result<Decoded<'a>, CodecError> {
        self.decode_selected(data, AbiEntry::is_function)
    }

    /// Decode the returndata of a successful call to `name`.
    pub fn decode_output<'a>(&'a self, name: &str, data: &[u8]) -> Result<Decoded<'a>, CodecError> {
        let function = self
            .function(name)
            .ok_or_else(|| CodecError::UnknownFunction(name.to_string()))?;
        let params = function.outputs();
        Ok(Decoded {
            entry: function,
            params,
            values: codec::decode_params(params, data)?,
        })
    }

    /// Decode revert data as one of the ABI's custom errors.
    pub fn decode_error<'a>(&'a self, data: &[u8]) -> Result<Decoded<'a>, CodecError> {
        self.decode_selected(data, AbiEntry::is_error)
    }

    /// Decode revert data, recognizing `Error(string)` and `Panic(uint256)`
    /// besides the declared custom errors.
    pub fn decode_revert<'a>(&'a self, data: &[u8]) -> Result<Revert<'a>, CodecError> {
        let selector = Selector::from_prefix(data).ok_or_else(|| CodecError::truncated_selector(data))?;
        if selector == Selector::ERROR_STRING {
            let params = [Param::new("message", AbiType::String)];
            return match codec::decode_params(&params, &data[4..])?.pop() {
                Some(AbiValue::String(message)) => Ok(Revert::Message(message)),
                _ => Err(CodecError::malformed("message".to_string(), 4, "expected a string")),
            };
        }
        if selector == Selector::PANIC {
            let params = [Param::new("code", AbiType::Uint(256))];
            return match codec::decode_params(&params, &data[4..])?.pop() {
                Some(AbiValue::Uint(code)) => Ok(Revert::Panic(code)),
                _ => Err(CodecError::malformed("code".to_string(), 4, "expected an integer")),
            };
        }
        self.decode_error(data).map(Revert::Custom)
    }

    fn decode_selected<'a>(
        &'a self,
        data: &[u8],
        accept: fn(&AbiEntry) -> bool,
    ) -> Result<Decoded<'a>, CodecError> {
        let entry = self.classify(data)?;
        if !accept(entry) {
            return Err(CodecError::UnknownSelector {
                selector: Selector::from_prefix(data).ok_or_else(|| CodecError::truncated_selector(data))?,
                data: data.to_vec(),
            });
        }
        Ok(Decoded {
            entry,
            params: &entry.inputs,
            values: codec::decode_params(&entry.inputs, &data[4..])?,
        })
    }

    /// Decode a log from its topics and data. Topic 0 selects the event.
    pub fn decode_log<'a>(&'a self, topics: &[[u8; 32]], data: &[u8]) -> Result<DecodedLog<'a>, CodecError> {
        let (topic0, rest) = topics
            .split_first()
            .ok_or_else(|| CodecError::malformed("topics".to_string(), 0, "log has no topics"))?;
        let event = self.event_by_topic(topic0).ok_or_else(|| CodecError::UnknownTopic {
            topic: hex::encode(topic0),
        })?;

        let indexed = event.inputs.iter().filter(|p| p.indexed).count();
        if indexed != rest.len() {
            return Err(CodecError::malformed(
                "topics".to_string(),
                0,
                format!("`{}` has {indexed} indexed parameters but the log carries {} topics", event.name, rest.len()),
            ));
        }

        let data_params: Vec<Param> = event.inputs.iter().filter(|p| !p.indexed).cloned().collect();
        let mut data_values = codec::decode_params(&data_params, data)?.into_iter();
        let mut topic_values = rest.iter();

        let mut values = Vec::with_capacity(event.inputs.len());
        for param in &event.inputs {
            let value = if param.indexed {
                let topic = topic_values
                    .next()
                    .ok_or_else(|| CodecError::malformed(param.name.clone(), 0, "missing topic"))?;
                decode_topic(&param.ty, topic).map_err(|e| e.within(&param.name))?
            } else {
                data_values
                    .next()
                    .ok_or_else(|| CodecError::malformed(param.name.clone(), 0, "missing data value"))?
            };
            values.push(value);
        }

        Ok(Decoded {
            entry: event,
            params: &event.inputs,
            values,
        })
    }
}

fn find_named<'a>(mut entries: impl Iterator<Item = &'a AbiEntry>, name: &str) -> Option<&'a AbiEntry> {
    if name.contains('(') {
        entries.find(|e| e.signature() == name)
    } else {
        entries.find(|e| e.name == name)
    }
}

/// Value types are stored in the topic word as-is; everything else is
/// hashed and cannot be recovered.
fn decode_topic(ty: &AbiType, topic: &[u8; 32]) -> Result<AbiValue, CodecError> {
    match ty {
        AbiType::Uint(_) | AbiType::Int(_) | AbiType::Bool | AbiType::Address | AbiType::FixedBytes(_) => {
            codec::decode(ty, topic, 0).map(|(value, _)| value)
        }
        _ => Ok(AbiValue::FixedBytes(topic.to_vec())),
    }
}

fn collect_structs(ty: &AbiType, structs: &mut BTreeMap<String, AbiEntry>, failures: &mut Vec<SchemaError>) {
    match ty {
        AbiType::Array(inner) | AbiType::FixedArray(inner, _) => collect_structs(inner, structs, failures),
        AbiType::Tuple(tuple) => {
            for field in &tuple.fields {
                collect_structs(&field.ty, structs, failures);
            }
            let Some(name) = &tuple.struct_name else {
                return;
            };
            let def = AbiEntry::new(name.clone(), EntryKind::Struct, tuple.fields.clone());
            match structs.get(name) {
                Some(existing) if existing.signature() != def.signature() => {
                    let conflict = SchemaError::ConflictingStruct {
                        name: name.clone(),
                        first: existing.signature().to_string(),
                        second: def.signature().to_string(),
                    };
                    if !failures.contains(&conflict) {
                        warn!(error = %conflict, "conflicting struct layouts");
                        failures.push(conflict);
                    }
                }
                Some(_) => {}
                None => {
                    debug!(signature = def.signature(), "collected struct");
                    structs.insert(name.clone(), def);
                }
            }
        }
        _ => {}
    }
}
