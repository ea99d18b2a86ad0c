use primitive_types::U256;

use crate::AccountAddress;

/// Append `value` as ULEB128.
pub fn write_uleb128(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Sequential BCS writer for opaque `vector<u8>` arguments that on-chain
/// code deserializes field by field.
#[derive(Debug, Clone, Default)]
pub struct ArgSerializer {
    buf: Vec<u8>,
}

impl ArgSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bool(mut self, value: bool) -> Self {
        self.buf.push(u8::from(value));
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u128(mut self, value: u128) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u256(mut self, value: U256) -> Self {
        let mut bytes = [0u8; 32];
        value.to_little_endian(&mut bytes);
        self.buf.extend_from_slice(&bytes);
        self
    }

    pub fn address(mut self, value: &AccountAddress) -> Self {
        self.buf.extend_from_slice(value.as_bytes());
        self
    }

    /// Length prefix for a sequence that follows.
    pub fn uleb128(mut self, value: u64) -> Self {
        write_uleb128(&mut self.buf, value);
        self
    }

    pub fn addresses(self, values: &[AccountAddress]) -> Self {
        values
            .iter()
            .fold(self.uleb128(values.len() as u64), |s, addr| s.address(addr))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
