//! Aptos fullnode REST adapter implementing `ChainGateway`.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::panic)]

pub use client::{AptosClient, ClientError};
pub use gateway::{AptosGateway, AptosGatewayConf};
pub use vm_status::parse_abort_code;

mod client;
mod gateway;
mod types;
mod vm_status;
