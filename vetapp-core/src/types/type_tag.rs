use std::{fmt, str::FromStr};

use serde::{ser::SerializeStruct, Serialize, Serializer};

use crate::{encode_address, AccountAddress, CodecError, Identifier};

/// A Move type argument.
///
/// BCS variant indices follow the chain's enum order, which is why `U16`,
/// `U32` and `U256` come last.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: Identifier,
    pub name: Identifier,
    pub type_args: Vec<TypeTag>,
}

impl TypeTag {
    fn variant(&self) -> (u32, &'static str) {
        match self {
            TypeTag::Bool => (0, "bool"),
            TypeTag::U8 => (1, "u8"),
            TypeTag::U64 => (2, "u64"),
            TypeTag::U128 => (3, "u128"),
            TypeTag::Address => (4, "address"),
            TypeTag::Signer => (5, "signer"),
            TypeTag::Vector(_) => (6, "vector"),
            TypeTag::Struct(_) => (7, "struct"),
            TypeTag::U16 => (8, "u16"),
            TypeTag::U32 => (9, "u32"),
            TypeTag::U256 => (10, "u256"),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(tag) => write!(f, "{tag}"),
            other => f.write_str(other.variant().1),
        }
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if !self.type_args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl Serialize for TypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            return serializer.collect_str(self);
        }
        let (index, name) = self.variant();
        match self {
            TypeTag::Vector(inner) => {
                serializer.serialize_newtype_variant("TypeTag", index, name, inner.as_ref())
            }
            TypeTag::Struct(tag) => {
                serializer.serialize_newtype_variant("TypeTag", index, name, tag.as_ref())
            }
            _ => serializer.serialize_unit_variant("TypeTag", index, name),
        }
    }
}

impl Serialize for StructTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            return serializer.collect_str(self);
        }
        let mut state = serializer.serialize_struct("StructTag", 4)?;
        state.serialize_field("address", &self.address)?;
        state.serialize_field("module", &self.module)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type_args", &self.type_args)?;
        state.end()
    }
}

impl FromStr for TypeTag {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeTagParser { src: s, pos: 0 };
        let tag = parser.tag()?;
        parser.skip_whitespace();
        if parser.pos != s.len() {
            return Err(parser.error());
        }
        Ok(tag)
    }
}

/// Recursive-descent parser over `vector<...>` and `addr::module::Name<...>`.
struct TypeTagParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TypeTagParser<'a> {
    fn error(&self) -> CodecError {
        CodecError::InvalidTypeTag(self.src.to_owned())
    }

    fn rest(&self) -> &'a str {
        let src: &'a str = self.src;
        &src[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), CodecError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn word(&mut self) -> Result<&'a str, CodecError> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error());
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn tag(&mut self) -> Result<TypeTag, CodecError> {
        let word = self.word()?;
        if self.eat("::") {
            return self.struct_tag(word).map(|tag| TypeTag::Struct(Box::new(tag)));
        }
        Ok(match word {
            "bool" => TypeTag::Bool,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "u128" => TypeTag::U128,
            "u256" => TypeTag::U256,
            "address" => TypeTag::Address,
            "signer" => TypeTag::Signer,
            "vector" => {
                self.expect("<")?;
                let inner = self.tag()?;
                self.expect(">")?;
                TypeTag::Vector(Box::new(inner))
            }
            _ => return Err(self.error()),
        })
    }

    fn struct_tag(&mut self, address: &str) -> Result<StructTag, CodecError> {
        let address = encode_address(address).map_err(|_| self.error())?;
        let module = Identifier::new(self.word()?).map_err(|_| self.error())?;
        self.expect("::")?;
        let name = Identifier::new(self.word()?).map_err(|_| self.error())?;
        let mut type_args = Vec::new();
        if self.eat("<") {
            loop {
                type_args.push(self.tag()?);
                if self.eat(">") {
                    break;
                }
                self.expect(",")?;
            }
        }
        Ok(StructTag {
            address,
            module,
            name,
            type_args,
        })
    }
}
