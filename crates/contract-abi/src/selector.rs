//! Keccak-256 based selectors and event topics.

use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Keccak-256 digest of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    hasher.finalize().into()
}

/// Topic 0 of a non-anonymous event: the full digest of its signature.
pub fn event_topic(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

/// The 4-byte identifier of a function or custom error.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector([u8; 4]);

impl Selector {
    /// Selector of the standard `Error(string)` revert payload.
    pub const ERROR_STRING: Selector = Selector([0x08, 0xc3, 0x79, 0xa0]);
    /// Selector of the standard `Panic(uint256)` revert payload.
    pub const PANIC: Selector = Selector([0x4e, 0x48, 0x7b, 0x71]);

    pub const fn new(bytes: [u8; 4]) -> Self {
        Selector(bytes)
    }

    /// First four bytes of the Keccak-256 digest of a canonical signature,
    /// e.g. `transfer(address,uint256)`.
    pub fn from_signature(signature: &str) -> Self {
        let digest = keccak256(signature.as_bytes());
        Selector([digest[0], digest[1], digest[2], digest[3]])
    }

    /// Leading selector of a calldata or revert buffer.
    pub fn from_prefix(data: &[u8]) -> Option<Self> {
        match data {
            [a, b, c, d, ..] => Some(Selector([*a, *b, *c, *d])),
            _ => None,
        }
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Selector(bytes)
    }
}

impl AsRef<[u8]> for Selector {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector({self})")
    }
}

impl FromStr for Selector {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; 4];
        hex::decode_to_slice(digits, &mut bytes)?;
        Ok(Selector(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_erc20_transfer_selector() {
        let selector = Selector::from_signature("transfer(address,uint256)");
        assert_eq!(selector.to_bytes(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector.to_string(), "0xa9059cbb");
    }

    #[test]
    fn test_builtin_revert_selectors() {
        assert_eq!(Selector::from_signature("Error(string)"), Selector::ERROR_STRING);
        assert_eq!(Selector::from_signature("Panic(uint256)"), Selector::PANIC);
    }

    #[test]
    fn test_event_topic() {
        let topic = event_topic("Transfer(address,address,uint256)");
        assert_eq!(
            hex::encode(topic),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_empty_input_digest() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_from_prefix_and_parse() {
        assert_eq!(Selector::from_prefix(&[1, 2, 3]), None);
        let selector = Selector::from_prefix(&[0xa9, 0x05, 0x9c, 0xbb, 0xff]).unwrap();
        assert_eq!("0xa9059cbb".parse::<Selector>().unwrap(), selector);
        assert_eq!("a9059cbb".parse::<Selector>().unwrap(), selector);
        assert!("0xa9059c".parse::<Selector>().is_err());
    }
}
