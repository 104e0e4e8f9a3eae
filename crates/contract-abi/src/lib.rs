//! Parse contract ABI JSON, compute selectors and encode/decode the ABI
//! binary wire format.
//!
//! The generated bindings produced by `contract-bindgen` implement the
//! [`AbiStruct`] / [`AbiError`] traits from this crate and delegate all wire
//! handling to [`codec`].

pub mod binding;
pub mod codec;
pub mod convert;
pub mod error;
pub mod parser;
pub mod primitives;
pub mod schema;
pub mod selector;
pub mod types;
pub mod value;

pub use binding::{AbiError, AbiStruct, ErrorInfo, ErrorParam};
pub use codec::{decode, decode_params, encode, encode_params};
pub use convert::{FromAbiValue, IntoAbiValue, TupleReader};
pub use error::{CodecError, SchemaError};
pub use parser::{parse_abi_entries, ParsedAbi, RawAbiEntry, RawParam};
pub use primitives::{Address, AddressParseError, Bytes, FixedBytes};
pub use schema::{Decoded, DecodedLog, Revert, Schema};
pub use selector::{event_topic, keccak256, Selector};
pub use types::{AbiEntry, AbiType, EntryKind, Param, StateMutability, TupleType};
pub use value::AbiValue;

pub use num_bigint;
