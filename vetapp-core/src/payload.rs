use std::fmt;

use crate::{encode_arguments, CodecError, FunctionId, MoveValue, TypeTag};

/// An entry-function call: target, type arguments and BCS-encoded arguments.
/// Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct CallPayload {
    function: FunctionId,
    type_args: Vec<TypeTag>,
    args: Vec<Vec<u8>>,
}

impl CallPayload {
    pub fn new(function: FunctionId, args: Vec<Vec<u8>>) -> Self {
        Self {
            function,
            type_args: Vec::new(),
            args,
        }
    }

    /// Encode typed values in order.
    pub fn from_values(function: FunctionId, values: &[MoveValue]) -> Result<Self, CodecError> {
        Ok(Self::new(function, encode_arguments(values)?))
    }

    pub fn with_type_args(mut self, type_args: Vec<TypeTag>) -> Self {
        self.type_args = type_args;
        self
    }

    pub fn function(&self) -> &FunctionId {
        &self.function
    }

    pub fn type_args(&self) -> &[TypeTag] {
        &self.type_args
    }

    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }

    /// Arguments as `0x`-prefixed hex, for logs.
    pub fn hex_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| format!("0x{}", hex::encode(arg)))
            .collect()
    }
}

impl fmt::Debug for CallPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallPayload")
            .field("function", &format_args!("{}", self.function))
            .field("type_args", &self.type_args)
            .field("args", &self.hex_args())
            .finish()
    }
}
