//! Core types shared by every vetapp crate: Move addresses and argument
//! encoding, call payloads, the chain transaction model, signer identities and
//! the `ChainGateway` seam that chain adapters implement.

#![deny(clippy::unwrap_used, clippy::panic)]

pub use codec::*;
pub use error::*;
pub use network::*;
pub use payload::*;
pub use pool::*;
pub use protocol::*;
pub use signer::*;
pub use traits::*;
pub use transaction::*;
pub use types::*;

mod codec;
mod error;
mod network;
mod payload;
mod pool;
mod protocol;
mod signer;
mod traits;
mod transaction;
mod types;
