//! Wire encoding of entry-function arguments.
//!
//! Every argument of an entry-function call travels as its own BCS byte
//! string. `MoveValue` is the typed form, `ArgKind` names the type of a value
//! that still lives as free text (form fields, config), and `ArgSerializer`
//! writes opaque `vector<u8>` blobs that some entry functions unpack on chain.

pub use serializer::*;
pub use value::*;

mod serializer;
mod value;

/// Errors from address, identifier, type and argument encoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("invalid address format: {0:?}")]
    InvalidAddressFormat(String),
    #[error("invalid Move identifier: {0:?}")]
    InvalidIdentifier(String),
    #[error("invalid function id {0:?}, expected address::module::function")]
    InvalidFunctionId(String),
    #[error("invalid type tag: {0:?}")]
    InvalidTypeTag(String),
    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),
    #[error("{value:?} is not a valid {kind}")]
    InvalidValue { kind: ArgKind, value: String },
    #[error("bytes do not decode as {kind}: {reason}")]
    Decode { kind: ArgKind, reason: String },
    #[error("bcs serialization failed: {0}")]
    Bcs(String),
}

impl From<bcs::Error> for CodecError {
    fn from(err: bcs::Error) -> Self {
        CodecError::Bcs(err.to_string())
    }
}
