//! ABI binary encoding and decoding.
//!
//! Values are laid out in 32-byte words. Static types are written inline;
//! dynamic types leave an offset in the head of the enclosing tuple/array and
//! put their payload in the tail, in declaration order. [`encode`] writes the
//! value's own encoding (no leading offset word), which for a tuple is the
//! head/tail block itself; [`decode`] reads it back from a given offset.

use crate::error::{CodecError, ROOT_PATH};
use crate::primitives::Address;
use crate::types::{valid_bits, AbiType, Param};
use crate::value::AbiValue;
use num_bigint::{BigInt, BigUint, Sign};
use std::fmt::Write;

const WORD: usize = 32;

#[derive(Debug, Clone, Copy)]
enum Segment<'t> {
    Field(&'t str, usize),
    Index(usize),
}

/// Position inside the type tree, rendered only when an error is raised.
#[derive(Debug, Default)]
struct FieldPath<'t>(Vec<Segment<'t>>);

impl<'t> FieldPath<'t> {
    fn push(&mut self, segment: Segment<'t>) {
        self.0.push(segment);
    }

    fn pop(&mut self) {
        self.0.pop();
    }

    fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            match segment {
                Segment::Field(name, position) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    if name.is_empty() {
                        let _ = write!(out, "{position}");
                    } else {
                        out.push_str(name);
                    }
                }
                Segment::Index(i) => {
                    let _ = write!(out, "[{i}]");
                }
            }
        }
        if out.is_empty() {
            ROOT_PATH.to_string()
        } else {
            out
        }
    }
}

/// Encode `value` as an instance of `ty`.
pub fn encode(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    Encoder::default().encode(ty, value, &mut out)?;
    Ok(out)
}

/// Encode a parameter list the way calldata arguments and error payloads
/// are laid out after their selector.
pub fn encode_params(params: &[Param], values: &[AbiValue]) -> Result<Vec<u8>, CodecError> {
    if params.len() != values.len() {
        return Err(CodecError::TypeMismatch {
            path: ROOT_PATH.to_string(),
            expected: format!("{} values, found {}", params.len(), values.len()),
        });
    }
    let items = params
        .iter()
        .zip(values)
        .enumerate()
        .map(|(i, (param, value))| (Segment::Field(&param.name, i), &param.ty, value))
        .collect();
    let mut out = Vec::new();
    Encoder::default().encode_sequence(items, &mut out)?;
    Ok(out)
}

/// Decode an instance of `ty` whose encoding starts at `offset`.
///
/// Returns the value and the number of bytes its encoding spans from
/// `offset`. Trailing bytes after that are left alone.
pub fn decode(ty: &AbiType, data: &[u8], offset: usize) -> Result<(AbiValue, usize), CodecError> {
    let mut decoder = Decoder::new(data);
    let (value, end) = decoder.decode(ty, offset)?;
    Ok((value, end - offset))
}

/// Decode a parameter list laid out as by [`encode_params`].
pub fn decode_params(params: &[Param], data: &[u8]) -> Result<Vec<AbiValue>, CodecError> {
    let items = params
        .iter()
        .enumerate()
        .map(|(i, param)| (Segment::Field(&param.name, i), &param.ty));
    let mut decoder = Decoder::new(data);
    decoder.decode_sequence(items, 0).map(|(values, _)| values)
}

fn usize_word(n: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[24..].copy_from_slice(&(n as u64).to_be_bytes());
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

fn describe(value: &AbiValue) -> String {
    match value {
        AbiValue::FixedBytes(v) | AbiValue::Bytes(v) => format!("{} of length {}", value.kind(), v.len()),
        AbiValue::Array(v) | AbiValue::FixedArray(v) | AbiValue::Tuple(v) => {
            format!("{} of {} values", value.kind(), v.len())
        }
        _ => value.kind().to_string(),
    }
}

#[derive(Default)]
struct Encoder<'t> {
    path: FieldPath<'t>,
}

impl<'t> Encoder<'t> {
    fn encode(&mut self, ty: &'t AbiType, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), CodecError> {
        match (ty, value) {
            (AbiType::Uint(bits), AbiValue::Uint(v)) if valid_bits(*bits) => {
                if v.bits() > u64::from(*bits) {
                    return Err(self.out_of_range(*bits));
                }
                let bytes = v.to_bytes_be();
                let mut word = [0u8; WORD];
                word[WORD - bytes.len()..].copy_from_slice(&bytes);
                out.extend_from_slice(&word);
            }
            (AbiType::Int(bits), AbiValue::Int(v)) if valid_bits(*bits) => {
                let bytes = v.to_signed_bytes_be();
                if bytes.len() > usize::from(*bits / 8) {
                    return Err(self.out_of_range(*bits));
                }
                let fill = if v.sign() == Sign::Minus { 0xff } else { 0x00 };
                let mut word = [fill; WORD];
                word[WORD - bytes.len()..].copy_from_slice(&bytes);
                out.extend_from_slice(&word);
            }
            (AbiType::Bool, AbiValue::Bool(b)) => {
                let mut word = [0u8; WORD];
                word[WORD - 1] = u8::from(*b);
                out.extend_from_slice(&word);
            }
            (AbiType::Address, AbiValue::Address(address)) => {
                let mut word = [0u8; WORD];
                word[12..].copy_from_slice(address.as_bytes());
                out.extend_from_slice(&word);
            }
            (AbiType::FixedBytes(n), AbiValue::FixedBytes(bytes))
                if (1..=WORD).contains(n) && bytes.len() == *n =>
            {
                let mut word = [0u8; WORD];
                word[..*n].copy_from_slice(bytes);
                out.extend_from_slice(&word);
            }
            (AbiType::Bytes, AbiValue::Bytes(bytes)) => encode_payload(bytes, out),
            (AbiType::String, AbiValue::String(s)) => encode_payload(s.as_bytes(), out),
            (AbiType::Array(elem), AbiValue::Array(items)) => {
                out.extend_from_slice(&usize_word(items.len()));
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (Segment::Index(i), elem.as_ref(), item))
                    .collect();
                self.encode_sequence(items, out)?;
            }
            (AbiType::FixedArray(elem, len), AbiValue::FixedArray(items)) if items.len() == *len => {
                let items = items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| (Segment::Index(i), elem.as_ref(), item))
                    .collect();
                self.encode_sequence(items, out)?;
            }
            (AbiType::Tuple(tuple), AbiValue::Tuple(items)) if items.len() == tuple.fields.len() => {
                let items = tuple
                    .fields
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (field, item))| (Segment::Field(&field.name, i), &field.ty, item))
                    .collect();
                self.encode_sequence(items, out)?;
            }
            _ => {
                return Err(CodecError::TypeMismatch {
                    path: self.path.render(),
                    expected: format!("`{}`, found {}", ty.canonical(), describe(value)),
                })
            }
        }
        Ok(())
    }

    /// Head/tail layout shared by tuples and arrays: static items inline,
    /// dynamic items as an offset (relative to the start of this block) into
    /// a contiguous tail written in item order.
    fn encode_sequence(
        &mut self,
        items: Vec<(Segment<'t>, &'t AbiType, &AbiValue)>,
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        let head_len: usize = items.iter().map(|(_, ty, _)| ty.head_size()).sum();
        let mut head = Vec::with_capacity(head_len);
        let mut tail = Vec::new();
        for (segment, ty, value) in items {
            self.path.push(segment);
            if ty.is_dynamic() {
                head.extend_from_slice(&usize_word(head_len + tail.len()));
                self.encode(ty, value, &mut tail)?;
            } else {
                self.encode(ty, value, &mut head)?;
            }
            self.path.pop();
        }
        out.extend_from_slice(&head);
        out.extend_from_slice(&tail);
        Ok(())
    }

    fn out_of_range(&self, bits: u16) -> CodecError {
        CodecError::OutOfRange {
            path: self.path.render(),
            bits,
        }
    }
}

fn encode_payload(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&usize_word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(out.len() + padded_len(bytes.len()) - bytes.len(), 0);
}

struct Decoder<'d, 't> {
    data: &'d [u8],
    path: FieldPath<'t>,
}

impl<'d, 't> Decoder<'d, 't> {
    fn new(data: &'d [u8]) -> Self {
        Self {
            data,
            path: FieldPath::default(),
        }
    }

    fn malformed(&self, offset: usize, reason: impl Into<String>) -> CodecError {
        CodecError::malformed(self.path.render(), offset, reason)
    }

    fn word(&self, at: usize) -> Result<&'d [u8], CodecError> {
        match at.checked_add(WORD) {
            Some(end) if end <= self.data.len() => Ok(&self.data[at..end]),
            _ => Err(self.malformed(
                at,
                format!("need 32 bytes, buffer has {}", self.data.len()),
            )),
        }
    }

    /// A length or offset word; anything beyond `usize` cannot address the
    /// buffer and is rejected.
    fn read_usize(&self, at: usize) -> Result<usize, CodecError> {
        let word = self.word(at)?;
        if word[..24].iter().any(|b| *b != 0) {
            return Err(self.malformed(at, "length or offset does not fit in 64 bits"));
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&word[24..]);
        usize::try_from(u64::from_be_bytes(low))
            .map_err(|_| self.malformed(at, "length or offset exceeds the address space"))
    }

    /// Decode the value whose encoding starts at `at`; returns the value and
    /// the end of the furthest byte its encoding covers.
    fn decode(&mut self, ty: &'t AbiType, at: usize) -> Result<(AbiValue, usize), CodecError> {
        match ty {
            AbiType::Uint(bits) => {
                self.check_bits("uint", *bits, at)?;
                let word = self.word(at)?;
                let lead = WORD - usize::from(*bits / 8);
                if word[..lead].iter().any(|b| *b != 0) {
                    return Err(self.malformed(at, format!("value exceeds uint{bits}")));
                }
                Ok((AbiValue::Uint(BigUint::from_bytes_be(&word[lead..])), at + WORD))
            }
            AbiType::Int(bits) => {
                self.check_bits("int", *bits, at)?;
                let word = self.word(at)?;
                let lead = WORD - usize::from(*bits / 8);
                let body = &word[lead..];
                let fill = if body[0] & 0x80 != 0 { 0xff } else { 0x00 };
                if word[..lead].iter().any(|b| *b != fill) {
                    return Err(self.malformed(at, format!("value is not a sign-extended int{bits}")));
                }
                Ok((AbiValue::Int(BigInt::from_signed_bytes_be(body)), at + WORD))
            }
            AbiType::Bool => {
                let word = self.word(at)?;
                if word[..WORD - 1].iter().any(|b| *b != 0) || word[WORD - 1] > 1 {
                    return Err(self.malformed(at, "bool word must be 0 or 1"));
                }
                Ok((AbiValue::Bool(word[WORD - 1] == 1), at + WORD))
            }
            AbiType::Address => {
                let word = self.word(at)?;
                if word[..12].iter().any(|b| *b != 0) {
                    return Err(self.malformed(at, "address has non-zero high bytes"));
                }
                let address = Address::from_slice(&word[12..])
                    .ok_or_else(|| self.malformed(at, "address must be 20 bytes"))?;
                Ok((AbiValue::Address(address), at + WORD))
            }
            AbiType::FixedBytes(n) => {
                if !(1..=WORD).contains(n) {
                    return Err(self.malformed(at, format!("bytes{n} is not a valid type")));
                }
                let word = self.word(at)?;
                if word[*n..].iter().any(|b| *b != 0) {
                    return Err(self.malformed(at, format!("bytes{n} has non-zero padding")));
                }
                Ok((AbiValue::FixedBytes(word[..*n].to_vec()), at + WORD))
            }
            AbiType::Bytes => {
                let (payload, end) = self.payload(at)?;
                Ok((AbiValue::Bytes(payload.to_vec()), end))
            }
            AbiType::String => {
                let (payload, end) = self.payload(at)?;
                let s = String::from_utf8(payload.to_vec())
                    .map_err(|e| self.malformed(at + WORD, format!("invalid UTF-8: {e}")))?;
                Ok((AbiValue::String(s), end))
            }
            AbiType::Array(elem) => {
                let len = self.read_usize(at)?;
                let base = at + WORD;
                let min_size = elem.head_size().max(1);
                let remaining = self.data.len().saturating_sub(base);
                if len > remaining / min_size {
                    return Err(self.malformed(
                        at,
                        format!("array length {len} exceeds the {remaining} remaining bytes"),
                    ));
                }
                let items = (0..len).map(move |i| (Segment::Index(i), elem.as_ref()));
                let (values, end) = self.decode_sequence(items, base)?;
                Ok((AbiValue::Array(values), end.max(base)))
            }
            AbiType::FixedArray(elem, len) => {
                let remaining = self.data.len().saturating_sub(at);
                if len.checked_mul(elem.head_size()).map_or(true, |size| size > remaining) {
                    return Err(self.malformed(
                        at,
                        format!("{len} elements do not fit in the {remaining} remaining bytes"),
                    ));
                }
                let items = (0..*len).map(move |i| (Segment::Index(i), elem.as_ref()));
                let (values, end) = self.decode_sequence(items, at)?;
                Ok((AbiValue::FixedArray(values), end))
            }
            AbiType::Tuple(tuple) => {
                let items = tuple
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, field)| (Segment::Field(&field.name, i), &field.ty));
                let (values, end) = self.decode_sequence(items, at)?;
                Ok((AbiValue::Tuple(values), end))
            }
        }
    }

    /// Length-prefixed payload of `bytes`/`string`.
    fn payload(&self, at: usize) -> Result<(&'d [u8], usize), CodecError> {
        let len = self.read_usize(at)?;
        let start = at + WORD;
        let end = start
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                self.malformed(
                    at,
                    format!("payload of {len} bytes runs past the end of the buffer"),
                )
            })?;
        let padded_end = start.saturating_add(padded_len(len)).min(self.data.len());
        Ok((&self.data[start..end], padded_end))
    }

    fn check_bits(&self, prefix: &str, bits: u16, at: usize) -> Result<(), CodecError> {
        if valid_bits(bits) {
            Ok(())
        } else {
            Err(self.malformed(at, format!("{prefix}{bits} is not a valid type")))
        }
    }

    /// Read a head/tail block starting at `base`. Offsets are relative to
    /// `base` and must land after the head. Each dynamic item must start at
    /// or after the end of the previous one, so no tail bytes are shared.
    fn decode_sequence<I>(&mut self, items: I, base: usize) -> Result<(Vec<AbiValue>, usize), CodecError>
    where
        I: Iterator<Item = (Segment<'t>, &'t AbiType)> + Clone,
    {
        let head_len = items
            .clone()
            .try_fold(0usize, |acc, (_, ty)| acc.checked_add(ty.head_size()))
            .ok_or_else(|| self.malformed(base, "head size overflows"))?;
        let head_end = base
            .checked_add(head_len)
            .ok_or_else(|| self.malformed(base, "head size overflows"))?;
        let mut head = base;
        let mut end = base;
        let mut tail_end = head_end;
        let mut values = Vec::new();

        for (segment, ty) in items {
            self.path.push(segment);
            let (value, value_end) = if ty.is_dynamic() {
                let relative = self.read_usize(head)?;
                let start = base
                    .checked_add(relative)
                    .filter(|start| *start <= self.data.len())
                    .ok_or_else(|| {
                        self.malformed(head, format!("offset {relative} points outside the buffer"))
                    })?;
                if start < head_end {
                    return Err(self.malformed(
                        head,
                        format!("offset {relative} points into the head"),
                    ));
                }
                if start < tail_end {
                    return Err(self.malformed(
                        head,
                        format!("offset {relative} overlaps the previous tail entry"),
                    ));
                }
                let (value, value_end) = self.decode(ty, start)?;
                tail_end = value_end;
                (value, value_end)
            } else {
                self.decode(ty, head)?
            };
            self.path.pop();
            values.push(value);
            head = head.saturating_add(ty.head_size());
            end = end.max(value_end).max(head);
        }
        Ok((values, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TupleType;

    fn word(hex_str: &str) -> Vec<u8> {
        let bytes = hex::decode(hex_str).unwrap();
        let mut word = vec![0u8; 32 - bytes.len()];
        word.extend(bytes);
        word
    }

    fn right_padded(hex_str: &str) -> Vec<u8> {
        let mut bytes = hex::decode(hex_str).unwrap();
        bytes.resize(32, 0);
        bytes
    }

    fn ty(s: &str) -> AbiType {
        s.parse().unwrap()
    }

    #[test]
    fn test_static_in_head_dynamic_in_tail() {
        let record = AbiType::Tuple(TupleType::new(vec![
            Param::new("count", AbiType::Uint(8)),
            Param::new("data", AbiType::Bytes),
        ]));
        let value = AbiValue::Tuple(vec![
            AbiValue::uint(5),
            AbiValue::Bytes(vec![0x01, 0x02, 0x03]),
        ]);

        let expected = [word("05"), word("40"), word("03"), right_padded("010203")].concat();
        let encoded = encode(&record, &value).unwrap();
        assert_eq!(encoded, expected);

        let (decoded, consumed) = decode(&record, &encoded, 0).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn test_field_order_is_preserved() {
        let record = AbiType::Tuple(TupleType::new(vec![
            Param::new("amount", AbiType::Uint(256)),
            Param::new("recipient", AbiType::Address),
        ]));
        let recipient = Address::new([0x11; 20]);
        let value = AbiValue::Tuple(vec![AbiValue::uint(1000), AbiValue::Address(recipient)]);
        let encoded = encode(&record, &value).unwrap();
        assert_eq!(&encoded[..32], word("03e8").as_slice());
        assert_eq!(&encoded[44..64], &[0x11; 20]);

        // the swapped layout reads the amount word as an address (fine) and
        // the address word as a uint; the values must come back swapped, not
        // silently matched by type
        let swapped = AbiType::Tuple(TupleType::new(vec![
            Param::new("recipient", AbiType::Address),
            Param::new("amount", AbiType::Uint(256)),
        ]));
        let (decoded, _) = decode(&swapped, &encoded, 0).unwrap();
        assert_ne!(decoded, value);
        assert_eq!(decoded.as_slice().unwrap()[0].as_address().unwrap().as_bytes()[19], 0xe8);
    }

    #[test]
    fn test_string_array_offsets() {
        let value = AbiValue::Array(vec![AbiValue::string("a"), AbiValue::string("bc")]);
        let encoded = encode(&ty("string[]"), &value).unwrap();
        let expected = [
            word("02"),
            word("40"),
            word("80"),
            word("01"),
            right_padded("61"),
            word("02"),
            right_padded("6263"),
        ]
        .concat();
        assert_eq!(encoded, expected);
        assert_eq!(decode(&ty("string[]"), &encoded, 0).unwrap().0, value);
    }

    #[test]
    fn test_params_layout_has_outer_offset() {
        let params = vec![Param::new("note", AbiType::String)];
        let encoded = encode_params(&params, &[AbiValue::string("hi")]).unwrap();
        assert_eq!(encoded, [word("20"), word("02"), right_padded("6869")].concat());
        assert_eq!(decode_params(&params, &encoded).unwrap(), vec![AbiValue::string("hi")]);
    }

    #[test]
    fn test_negative_int_is_sign_extended() {
        let encoded = encode(&AbiType::Int(8), &AbiValue::int(-1)).unwrap();
        assert_eq!(encoded, vec![0xff; 32]);
        assert_eq!(decode(&AbiType::Int(8), &encoded, 0).unwrap().0, AbiValue::int(-1));

        let encoded = encode(&AbiType::Int(256), &AbiValue::int(-2)).unwrap();
        assert_eq!(encoded[31], 0xfe);
    }

    #[test]
    fn test_out_of_range_integers() {
        let err = encode(&AbiType::Uint(8), &AbiValue::uint(256)).unwrap_err();
        assert!(matches!(err, CodecError::OutOfRange { bits: 8, .. }));
        let err = encode(&AbiType::Int(8), &AbiValue::int(128)).unwrap_err();
        assert!(matches!(err, CodecError::OutOfRange { bits: 8, .. }));
        assert!(encode(&AbiType::Int(8), &AbiValue::int(-128)).is_ok());
    }

    #[test]
    fn test_type_mismatch_names_field() {
        let record = AbiType::Tuple(TupleType::new(vec![
            Param::new("owner", AbiType::Address),
            Param::new("tags", AbiType::FixedArray(Box::new(AbiType::FixedBytes(4)), 2)),
        ]));
        let value = AbiValue::Tuple(vec![
            AbiValue::Address(Address::ZERO),
            AbiValue::FixedArray(vec![
                AbiValue::FixedBytes(vec![1, 2, 3, 4]),
                AbiValue::FixedBytes(vec![1, 2, 3]),
            ]),
        ]);
        match encode(&record, &value).unwrap_err() {
            CodecError::TypeMismatch { path, expected } => {
                assert_eq!(path, "tags[1]");
                assert!(expected.contains("bytes4"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_short_buffer_is_malformed() {
        let err = decode(&AbiType::Uint(256), &[1, 2, 3], 0).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { offset: 0, .. }));
    }

    #[test]
    fn test_offset_outside_buffer() {
        let data = [word("20"), word("ffff")].concat();
        let params = vec![Param::new("blob", AbiType::Bytes)];
        let err = decode_params(&params, &data).unwrap_err();
        match err {
            CodecError::Malformed { path, .. } => assert_eq!(path, "blob"),
            other => panic!("unexpected error {other:?}"),
        }

        let data = [word("ffffffff")].concat();
        assert!(decode_params(&params, &data).is_err());
    }

    #[test]
    fn test_offset_into_head_rejected() {
        let params = vec![
            Param::new("a", AbiType::Bytes),
            Param::new("b", AbiType::Uint(256)),
        ];
        // offset 0x20 points at the second head slot
        let data = [word("20"), word("01"), word("01")].concat();
        assert!(matches!(
            decode_params(&params, &data),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_huge_array_length_rejected() {
        let data = [word("ffffffffffff"), word("01")].concat();
        let err = decode(&ty("uint256[]"), &data, 0).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { offset: 0, .. }));
    }

    #[test]
    fn test_shared_tail_offsets_rejected() {
        // both elements point at the same `bytes` payload
        let data = [word("02"), word("40"), word("40"), word("01"), right_padded("ab")].concat();
        match decode(&ty("bytes[]"), &data, 0).unwrap_err() {
            CodecError::Malformed { path, offset, reason } => {
                assert_eq!(path, "[1]");
                assert_eq!(offset, 64);
                assert!(reason.contains("overlaps"));
            }
            other => panic!("unexpected error {other:?}"),
        }

        let distinct = [
            word("02"),
            word("40"),
            word("80"),
            word("01"),
            right_padded("ab"),
            word("01"),
            right_padded("cd"),
        ]
        .concat();
        let (value, consumed) = decode(&ty("bytes[]"), &distinct, 0).unwrap();
        assert_eq!(
            value,
            AbiValue::Array(vec![AbiValue::Bytes(vec![0xab]), AbiValue::Bytes(vec![0xcd])])
        );
        assert_eq!(consumed, distinct.len());
    }

    #[test]
    fn test_nested_arrays_cannot_reuse_tails() {
        // outer uint256[][] with two offsets at one inner array
        let data = [word("02"), word("40"), word("40"), word("01"), word("07")].concat();
        assert!(matches!(
            decode(&ty("uint256[][]"), &data, 0),
            Err(CodecError::Malformed { .. })
        ));
    }

    #[test]
    fn test_oversized_fixed_array_rejected() {
        let err = decode(&ty("uint8[1000000000000]"), &[0u8; 32], 0).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { offset: 0, .. }));

        let err = decode(&ty("string[1000000000000]"), &[0u8; 64], 0).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { offset: 0, .. }));

        let short = [word("01"), word("02")].concat();
        assert!(matches!(
            decode(&ty("uint8[3]"), &short, 0),
            Err(CodecError::Malformed { offset: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_widths_are_errors() {
        let data = vec![0xff; 64];
        for bad in [
            AbiType::Int(7),
            AbiType::Int(0),
            AbiType::Uint(300),
            AbiType::FixedBytes(40),
            AbiType::FixedBytes(0),
        ] {
            assert!(
                matches!(decode(&bad, &data, 0), Err(CodecError::Malformed { .. })),
                "{bad:?}"
            );
        }

        assert!(matches!(
            encode(&AbiType::Uint(300), &AbiValue::uint(1)),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            encode(&AbiType::Int(7), &AbiValue::int(-1)),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            encode(&AbiType::FixedBytes(40), &AbiValue::FixedBytes(vec![0; 40])),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_strict_word_validation() {
        assert!(decode(&AbiType::Bool, &word("02"), 0).is_err());
        assert!(decode(&AbiType::Uint(8), &word("0100"), 0).is_err());
        assert!(decode(&AbiType::Address, &vec![0xff; 32], 0).is_err());
        assert!(decode(&AbiType::FixedBytes(1), &word("01"), 0).is_err());
        // 0x80 in an int8 slot must be sign-extended with 0xff
        assert!(decode(&AbiType::Int(8), &word("80"), 0).is_err());
    }

    #[test]
    fn test_invalid_utf8_path() {
        let record = AbiType::Tuple(TupleType::new(vec![
            Param::new("id", AbiType::Uint(256)),
            Param::new(
                "info",
                AbiType::Tuple(TupleType::new(vec![Param::new("name", AbiType::String)])),
            ),
        ]));
        let data = [word("01"), word("40"), word("20"), word("01"), right_padded("ff")].concat();
        match decode(&record, &data, 0).unwrap_err() {
            CodecError::Malformed { path, reason, .. } => {
                assert_eq!(path, "info.name");
                assert!(reason.contains("UTF-8"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_decode_at_offset_reports_consumed() {
        let mut data = vec![0xaa; 7];
        let encoded = encode(&AbiType::Bytes, &AbiValue::Bytes(vec![9; 33])).unwrap();
        data.extend_from_slice(&encoded);
        let (value, consumed) = decode(&AbiType::Bytes, &data, 7).unwrap();
        assert_eq!(value, AbiValue::Bytes(vec![9; 33]));
        assert_eq!(consumed, 96);
    }

    #[test]
    fn test_reencode_matches_input() {
        let ty = ty("(uint256,string,(bool,bytes)[],int16[2])");
        let value = AbiValue::Tuple(vec![
            AbiValue::uint(42),
            AbiValue::string("registry"),
            AbiValue::Array(vec![
                AbiValue::Tuple(vec![AbiValue::Bool(true), AbiValue::Bytes(vec![])]),
                AbiValue::Tuple(vec![AbiValue::Bool(false), AbiValue::Bytes(vec![7; 40])]),
            ]),
            AbiValue::FixedArray(vec![AbiValue::int(-300), AbiValue::int(300)]),
        ]);
        let encoded = encode(&ty, &value).unwrap();
        let (decoded, consumed) = decode(&ty, &encoded, 0).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(consumed, encoded.len());
        assert_eq!(encode(&ty, &decoded).unwrap(), encoded);
    }
}
