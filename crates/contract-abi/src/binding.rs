//! Traits implemented by generated struct and error bindings.

use crate::codec;
use crate::convert::{FromAbiValue, IntoAbiValue};
use crate::error::CodecError;
use crate::selector::Selector;
use crate::types::AbiType;

/// A generated record bound to an ABI tuple type.
pub trait AbiStruct: IntoAbiValue + FromAbiValue {
    /// ABI name of the struct or error.
    const NAME: &'static str;
    /// Canonical signature, `Name(t1,t2,...)`.
    const SIGNATURE: &'static str;

    /// Tuple type the record encodes as.
    fn abi_type() -> AbiType;

    fn abi_encode(&self) -> Result<Vec<u8>, CodecError> {
        codec::encode(&Self::abi_type(), &self.to_abi_value())
    }

    fn abi_decode(data: &[u8]) -> Result<Self, CodecError> {
        let (value, _) = codec::decode(&Self::abi_type(), data, 0)?;
        Self::from_abi_value(value)
    }
}

/// A generated custom error, carried in revert data behind its selector.
pub trait AbiError: AbiStruct {
    const SELECTOR: Selector;

    fn abi_encode_with_selector(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Self::SELECTOR.to_bytes().to_vec();
        out.extend(self.abi_encode()?);
        Ok(out)
    }

    fn abi_decode_with_selector(data: &[u8]) -> Result<Self, CodecError> {
        let selector = Selector::from_prefix(data).ok_or_else(|| CodecError::truncated_selector(data))?;
        if selector != Self::SELECTOR {
            return Err(CodecError::UnknownSelector {
                selector,
                data: data.to_vec(),
            });
        }
        Self::abi_decode(&data[4..])
    }
}

/// Static description of a custom error, emitted into generated `ERROR_INFO`
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorInfo {
    pub name: &'static str,
    /// `0x`-prefixed selector hex.
    pub selector: &'static str,
    pub signature: &'static str,
    pub inputs: &'static [ErrorParam],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorParam {
    pub name: &'static str,
    pub solidity_type: &'static str,
    pub rust_type: &'static str,
}

impl ErrorInfo {
    /// Look up an error by the selector prefix of revert data.
    pub fn find<'a>(table: &'a [ErrorInfo], data: &[u8]) -> Option<&'a ErrorInfo> {
        let selector = Selector::from_prefix(data)?.to_string();
        table.iter().find(|info| info.selector == selector)
    }
}
