use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Sha3_256};

use crate::CodecError;

/// Length of a Move account address in bytes.
pub const ADDRESS_LENGTH: usize = 32;

const OBJECT_FROM_SEED_SCHEME: u8 = 0xFE;
const RESOURCE_ACCOUNT_SCHEME: u8 = 0xFF;

/// A 32-byte Move account address.
///
/// Displays as the normalized long form: `0x` followed by 64 lowercase hex
/// digits. Human-readable serializers (JSON, config) see that string while
/// BCS sees the raw 32 bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountAddress([u8; ADDRESS_LENGTH]);

impl AccountAddress {
    pub const ZERO: Self = Self([0u8; ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; ADDRESS_LENGTH] {
        self.0
    }

    /// `0x` + 64 lowercase hex digits.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

/// Parse text into an address. Accepts 1 to 64 hex digits with or without a
/// `0x` prefix, in any case, and left-pads with zeros. Never truncates.
/// Whitespace is a non-hex character; callers trim form input first.
pub fn encode_address(text: &str) -> Result<AccountAddress, CodecError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);

    if digits.is_empty()
        || digits.len() > ADDRESS_LENGTH * 2
        || !digits.chars().all(|c| c.is_ascii_hexdigit())
    {
        return Err(CodecError::InvalidAddressFormat(text.to_owned()));
    }

    let padded = format!("{digits:0>64}");
    let mut bytes = [0u8; ADDRESS_LENGTH];
    hex::decode_to_slice(padded, &mut bytes)
        .map_err(|_| CodecError::InvalidAddressFormat(text.to_owned()))?;
    Ok(AccountAddress(bytes))
}

/// Normalized long form of an address.
pub fn decode_address(address: &AccountAddress) -> String {
    address.to_hex_literal()
}

/// Address of a resource account created by `creator` with `seed`.
pub fn derive_resource_address(creator: &AccountAddress, seed: &[u8]) -> AccountAddress {
    derive_with_scheme(creator, seed, RESOURCE_ACCOUNT_SCHEME)
}

/// Address of a named object created by `creator` with `seed`.
pub fn derive_object_address(creator: &AccountAddress, seed: &[u8]) -> AccountAddress {
    derive_with_scheme(creator, seed, OBJECT_FROM_SEED_SCHEME)
}

fn derive_with_scheme(creator: &AccountAddress, seed: &[u8], scheme: u8) -> AccountAddress {
    let mut hasher = Sha3_256::new();
    hasher.update(creator.as_bytes());
    hasher.update(seed);
    hasher.update([scheme]);
    AccountAddress(hasher.finalize().into())
}

impl FromStr for AccountAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        encode_address(s)
    }
}

impl From<[u8; ADDRESS_LENGTH]> for AccountAddress {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_newtype_struct("AccountAddress", &self.0)
        }
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            encode_address(&text).map_err(de::Error::custom)
        } else {
            #[derive(Deserialize)]
            #[serde(rename = "AccountAddress")]
            struct Raw([u8; ADDRESS_LENGTH]);

            Raw::deserialize(deserializer).map(|raw| AccountAddress(raw.0))
        }
    }
}
