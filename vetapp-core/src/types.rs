pub use address::*;
pub use hash::*;
pub use identifier::*;
pub use type_tag::*;

mod address;
mod hash;
mod identifier;
mod type_tag;
