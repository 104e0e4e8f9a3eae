//! Conversions between host types and [`AbiValue`].
//!
//! Generated bindings rely on these impls for every field; narrowing host
//! types (a `uint24` held in a `u32`) are range-checked again by the codec
//! when encoding.

use crate::error::CodecError;
use crate::primitives::{Address, Bytes, FixedBytes};
use crate::value::AbiValue;
use num_bigint::{BigInt, BigUint};

pub trait IntoAbiValue {
    fn to_abi_value(&self) -> AbiValue;
}

pub trait FromAbiValue: Sized {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError>;
}

fn mismatch(expected: impl Into<String>, found: &AbiValue) -> CodecError {
    CodecError::TypeMismatch {
        path: String::new(),
        expected: format!("{}, found {}", expected.into(), found.kind()),
    }
}

impl IntoAbiValue for AbiValue {
    fn to_abi_value(&self) -> AbiValue {
        self.clone()
    }
}

impl FromAbiValue for AbiValue {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        Ok(value)
    }
}

impl IntoAbiValue for bool {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::Bool(*self)
    }
}

impl FromAbiValue for bool {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::Bool(b) => Ok(b),
            other => Err(mismatch("bool", &other)),
        }
    }
}

macro_rules! impl_unsigned {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl IntoAbiValue for $ty {
            fn to_abi_value(&self) -> AbiValue {
                AbiValue::Uint(BigUint::from(*self))
            }
        }

        impl FromAbiValue for $ty {
            fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
                match value {
                    AbiValue::Uint(v) => <$ty>::try_from(&v).map_err(|_| CodecError::OutOfRange {
                        path: String::new(),
                        bits: $bits,
                    }),
                    other => Err(mismatch("uint", &other)),
                }
            }
        }
    )*};
}

macro_rules! impl_signed {
    ($($ty:ty => $bits:expr),* $(,)?) => {$(
        impl IntoAbiValue for $ty {
            fn to_abi_value(&self) -> AbiValue {
                AbiValue::Int(BigInt::from(*self))
            }
        }

        impl FromAbiValue for $ty {
            fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
                match value {
                    AbiValue::Int(v) => <$ty>::try_from(&v).map_err(|_| CodecError::OutOfRange {
                        path: String::new(),
                        bits: $bits,
                    }),
                    other => Err(mismatch("int", &other)),
                }
            }
        }
    )*};
}

impl_unsigned!(u8 => 8, u16 => 16, u32 => 32, u64 => 64, u128 => 128);
impl_signed!(i8 => 8, i16 => 16, i32 => 32, i64 => 64, i128 => 128);

impl IntoAbiValue for BigUint {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::Uint(self.clone())
    }
}

impl FromAbiValue for BigUint {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::Uint(v) => Ok(v),
            other => Err(mismatch("uint", &other)),
        }
    }
}

impl IntoAbiValue for BigInt {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::Int(self.clone())
    }
}

impl FromAbiValue for BigInt {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::Int(v) => Ok(v),
            other => Err(mismatch("int", &other)),
        }
    }
}

impl IntoAbiValue for Address {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::Address(*self)
    }
}

impl FromAbiValue for Address {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::Address(a) => Ok(a),
            other => Err(mismatch("address", &other)),
        }
    }
}

impl IntoAbiValue for Bytes {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::Bytes(self.0.clone())
    }
}

impl FromAbiValue for Bytes {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::Bytes(b) => Ok(Bytes(b)),
            other => Err(mismatch("bytes", &other)),
        }
    }
}

impl<const N: usize> IntoAbiValue for FixedBytes<N> {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::FixedBytes(self.0.to_vec())
    }
}

impl<const N: usize> FromAbiValue for FixedBytes<N> {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::FixedBytes(b) => {
                let found = b.len();
                FixedBytes::from_slice(&b).ok_or_else(|| CodecError::TypeMismatch {
                    path: String::new(),
                    expected: format!("bytes{N}, found {found} bytes"),
                })
            }
            other => Err(mismatch(format!("bytes{N}"), &other)),
        }
    }
}

impl IntoAbiValue for String {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::String(self.clone())
    }
}

impl FromAbiValue for String {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl<T: IntoAbiValue> IntoAbiValue for Vec<T> {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::Array(self.iter().map(IntoAbiValue::to_abi_value).collect())
    }
}

impl<T: FromAbiValue> FromAbiValue for Vec<T> {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| T::from_abi_value(item).map_err(|e| e.within(&format!("[{i}]"))))
                .collect(),
            other => Err(mismatch("array", &other)),
        }
    }
}

impl<T: IntoAbiValue, const N: usize> IntoAbiValue for [T; N] {
    fn to_abi_value(&self) -> AbiValue {
        AbiValue::FixedArray(self.iter().map(IntoAbiValue::to_abi_value).collect())
    }
}

impl<T: FromAbiValue, const N: usize> FromAbiValue for [T; N] {
    fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
        match value {
            AbiValue::FixedArray(items) if items.len() == N => {
                let items = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| T::from_abi_value(item).map_err(|e| e.within(&format!("[{i}]"))))
                    .collect::<Result<Vec<T>, _>>()?;
                items.try_into().map_err(|_| CodecError::TypeMismatch {
                    path: String::new(),
                    expected: format!("fixed array of {N} values"),
                })
            }
            other => Err(mismatch(format!("fixed array of {N} values"), &other)),
        }
    }
}

macro_rules! impl_tuple {
    ($len:expr => $($name:ident $idx:tt),+) => {
        impl<$($name: IntoAbiValue),+> IntoAbiValue for ($($name,)+) {
            fn to_abi_value(&self) -> AbiValue {
                AbiValue::Tuple(vec![$(self.$idx.to_abi_value()),+])
            }
        }

        impl<$($name: FromAbiValue),+> FromAbiValue for ($($name,)+) {
            fn from_abi_value(value: AbiValue) -> Result<Self, CodecError> {
                let mut fields = TupleReader::new(value, $len)?;
                Ok(($(fields.next::<$name>(stringify!($idx))?,)+))
            }
        }
    };
}

impl_tuple!(1 => A 0);
impl_tuple!(2 => A 0, B 1);
impl_tuple!(3 => A 0, B 1, C 2);
impl_tuple!(4 => A 0, B 1, C 2, D 3);
impl_tuple!(5 => A 0, B 1, C 2, D 3, E 4);
impl_tuple!(6 => A 0, B 1, C 2, D 3, E 4, F 5);
impl_tuple!(7 => A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_tuple!(8 => A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);

/// Reads tuple fields in declaration order, tagging conversion failures with
/// the field name.
pub struct TupleReader {
    fields: std::vec::IntoIter<AbiValue>,
}

impl TupleReader {
    pub fn new(value: AbiValue, arity: usize) -> Result<Self, CodecError> {
        match value {
            AbiValue::Tuple(fields) if fields.len() == arity => Ok(Self {
                fields: fields.into_iter(),
            }),
            AbiValue::Tuple(fields) => Err(CodecError::TypeMismatch {
                path: String::new(),
                expected: format!("tuple of {arity} fields, found {}", fields.len()),
            }),
            other => Err(mismatch(format!("tuple of {arity} fields"), &other)),
        }
    }

    pub fn next<T: FromAbiValue>(&mut self, field: &str) -> Result<T, CodecError> {
        let value = self.fields.next().ok_or_else(|| CodecError::TypeMismatch {
            path: field.to_string(),
            expected: "a value, found end of tuple".to_string(),
        })?;
        T::from_abi_value(value).map_err(|e| e.within(field))
    }
}
