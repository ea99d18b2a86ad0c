//! Command and query bindings behind the dApp's controls.
//!
//! Commands validate free-text input, build a [`vetapp_core::CallPayload`],
//! submit it through a wallet-backed signer and then drop the cached reads the
//! transaction changed. Queries are view calls behind a shared cache.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::panic)]

pub use cache::{QueryCache, QueryKey};
pub use commands::*;
pub use context::ActionContext;
pub use error::ActionError;
pub use format::format_units_8;
pub use guard::{InFlightGuard, InFlightTicket};
pub use preferences::{MemoryPreferenceStore, PreferenceStore, Preferences};
pub use queries::*;

pub mod validate;

mod cache;
mod commands;
mod context;
mod error;
mod format;
mod guard;
mod preferences;
mod queries;

#[cfg(test)]
mod test_utils;
