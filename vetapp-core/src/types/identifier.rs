use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{encode_address, AccountAddress, CodecError};

/// A Move identifier: `[A-Za-z_][A-Za-z0-9_]*`, not a lone underscore.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Result<Self, CodecError> {
        let name = name.into();
        if is_valid_identifier(&name) {
            Ok(Self(name))
        } else {
            Err(CodecError::InvalidIdentifier(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        Some('_') if name.len() > 1 => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for Identifier {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Identifier::new(name).map_err(de::Error::custom)
    }
}

/// A module on chain: owner address plus module name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ModuleId {
    pub address: AccountAddress,
    pub name: Identifier,
}

/// Fully qualified Move function: `address::module::function`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FunctionId {
    module: ModuleId,
    function: Identifier,
}

impl FunctionId {
    pub fn new(address: AccountAddress, module: Identifier, function: Identifier) -> Self {
        Self {
            module: ModuleId {
                address,
                name: module,
            },
            function,
        }
    }

    /// Build from string parts, validating both identifiers.
    pub fn from_parts(
        address: AccountAddress,
        module: &str,
        function: &str,
    ) -> Result<Self, CodecError> {
        Ok(Self::new(address, module.parse()?, function.parse()?))
    }

    pub fn address(&self) -> AccountAddress {
        self.module.address
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn module_name(&self) -> &Identifier {
        &self.module.name
    }

    pub fn function(&self) -> &Identifier {
        &self.function
    }
}

impl FromStr for FunctionId {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split("::").collect();
        let [address, module, function] = parts.as_slice() else {
            return Err(CodecError::InvalidFunctionId(s.to_owned()));
        };
        let address = encode_address(address)?;
        Self::from_parts(address, module, function)
            .map_err(|_| CodecError::InvalidFunctionId(s.to_owned()))
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.module.address, self.module.name, self.function
        )
    }
}

impl fmt::Debug for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionId({self})")
    }
}

impl Serialize for FunctionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FunctionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}
