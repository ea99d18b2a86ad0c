use std::fmt;

use primitive_types::U256;

use crate::{encode_address, AccountAddress, CodecError};

/// Type of an entry-function argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Bytes,
    AddressVector,
    U64Vector,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgKind::Bool => "bool",
            ArgKind::U8 => "u8",
            ArgKind::U16 => "u16",
            ArgKind::U32 => "u32",
            ArgKind::U64 => "u64",
            ArgKind::U128 => "u128",
            ArgKind::U256 => "u256",
            ArgKind::Address => "address",
            ArgKind::Bytes => "vector<u8>",
            ArgKind::AddressVector => "vector<address>",
            ArgKind::U64Vector => "vector<u64>",
        })
    }
}

/// A typed entry-function argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    Address(AccountAddress),
    Bytes(Vec<u8>),
    AddressVector(Vec<AccountAddress>),
    U64Vector(Vec<u64>),
}

impl MoveValue {
    pub fn kind(&self) -> ArgKind {
        match self {
            MoveValue::Bool(_) => ArgKind::Bool,
            MoveValue::U8(_) => ArgKind::U8,
            MoveValue::U16(_) => ArgKind::U16,
            MoveValue::U32(_) => ArgKind::U32,
            MoveValue::U64(_) => ArgKind::U64,
            MoveValue::U128(_) => ArgKind::U128,
            MoveValue::U256(_) => ArgKind::U256,
            MoveValue::Address(_) => ArgKind::Address,
            MoveValue::Bytes(_) => ArgKind::Bytes,
            MoveValue::AddressVector(_) => ArgKind::AddressVector,
            MoveValue::U64Vector(_) => ArgKind::U64Vector,
        }
    }
}

impl ArgKind {
    /// Parse free text into a value of this kind.
    ///
    /// Integers accept decimal digits only, so signs, separators and
    /// exponents are rejected rather than reinterpreted. Vectors are
    /// comma-separated; byte vectors are hex.
    pub fn parse_value(self, text: &str) -> Result<MoveValue, CodecError> {
        let text = text.trim();
        let invalid = || CodecError::InvalidValue {
            kind: self,
            value: text.to_owned(),
        };
        Ok(match self {
            ArgKind::Bool => match text {
                "true" => MoveValue::Bool(true),
                "false" => MoveValue::Bool(false),
                _ => return Err(invalid()),
            },
            ArgKind::U8 => MoveValue::U8(parse_digits(text).ok_or_else(invalid)?),
            ArgKind::U16 => MoveValue::U16(parse_digits(text).ok_or_else(invalid)?),
            ArgKind::U32 => MoveValue::U32(parse_digits(text).ok_or_else(invalid)?),
            ArgKind::U64 => MoveValue::U64(parse_digits(text).ok_or_else(invalid)?),
            ArgKind::U128 => MoveValue::U128(parse_digits(text).ok_or_else(invalid)?),
            ArgKind::U256 => {
                if !is_digits(text) {
                    return Err(invalid());
                }
                MoveValue::U256(U256::from_dec_str(text).map_err(|_| invalid())?)
            }
            ArgKind::Address => MoveValue::Address(encode_address(text)?),
            ArgKind::Bytes => {
                let digits = text.strip_prefix("0x").unwrap_or(text);
                MoveValue::Bytes(hex::decode(digits).map_err(|_| invalid())?)
            }
            ArgKind::AddressVector => MoveValue::AddressVector(
                split_list(text)
                    .map(encode_address)
                    .collect::<Result<_, _>>()?,
            ),
            ArgKind::U64Vector => MoveValue::U64Vector(
                split_list(text)
                    .map(|item| parse_digits(item).ok_or_else(invalid))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Decimal digits only, within the target width.
pub fn parse_digits<T: std::str::FromStr>(text: &str) -> Option<T> {
    if is_digits(text) {
        text.parse().ok()
    } else {
        None
    }
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn u256_bytes(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    bytes
}

/// BCS bytes of a single argument.
pub fn encode_argument(value: &MoveValue) -> Result<Vec<u8>, CodecError> {
    let bytes = match value {
        MoveValue::Bool(v) => bcs::to_bytes(v)?,
        MoveValue::U8(v) => bcs::to_bytes(v)?,
        MoveValue::U16(v) => bcs::to_bytes(v)?,
        MoveValue::U32(v) => bcs::to_bytes(v)?,
        MoveValue::U64(v) => bcs::to_bytes(v)?,
        MoveValue::U128(v) => bcs::to_bytes(v)?,
        MoveValue::U256(v) => u256_bytes(v).to_vec(),
        MoveValue::Address(v) => bcs::to_bytes(v)?,
        MoveValue::Bytes(v) => bcs::to_bytes(v)?,
        MoveValue::AddressVector(v) => bcs::to_bytes(v)?,
        MoveValue::U64Vector(v) => bcs::to_bytes(v)?,
    };
    Ok(bytes)
}

/// Encode each argument independently, preserving order.
pub fn encode_arguments(values: &[MoveValue]) -> Result<Vec<Vec<u8>>, CodecError> {
    values.iter().map(encode_argument).collect()
}

/// Decode bytes produced by [`encode_argument`] back into a value.
pub fn decode_argument(kind: ArgKind, bytes: &[u8]) -> Result<MoveValue, CodecError> {
    let decode_err = |e: bcs::Error| CodecError::Decode {
        kind,
        reason: e.to_string(),
    };
    Ok(match kind {
        ArgKind::Bool => MoveValue::Bool(bcs::from_bytes(bytes).map_err(decode_err)?),
        ArgKind::U8 => MoveValue::U8(bcs::from_bytes(bytes).map_err(decode_err)?),
        ArgKind::U16 => MoveValue::U16(bcs::from_bytes(bytes).map_err(decode_err)?),
        ArgKind::U32 => MoveValue::U32(bcs::from_bytes(bytes).map_err(decode_err)?),
        ArgKind::U64 => MoveValue::U64(bcs::from_bytes(bytes).map_err(decode_err)?),
        ArgKind::U128 => MoveValue::U128(bcs::from_bytes(bytes).map_err(decode_err)?),
        ArgKind::U256 => {
            let raw: [u8; 32] = bytes.try_into().map_err(|_| CodecError::Decode {
                kind,
                reason: format!("expected 32 bytes, got {}", bytes.len()),
            })?;
            MoveValue::U256(U256::from_little_endian(&raw))
        }
        ArgKind::Address => MoveValue::Address(bcs::from_bytes(bytes).map_err(decode_err)?),
        ArgKind::Bytes => MoveValue::Bytes(bcs::from_bytes(bytes).map_err(decode_err)?),
        ArgKind::AddressVector => {
            MoveValue::AddressVector(bcs::from_bytes(bytes).map_err(decode_err)?)
        }
        ArgKind::U64Vector => MoveValue::U64Vector(bcs::from_bytes(bytes).map_err(decode_err)?),
    })
}
