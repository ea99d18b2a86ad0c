//! The keeper fires the protocol's scheduled maintenance calls (hourly gauge
//! distribution) with a held key, and serves the dApp's static assets.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::panic)]

use eyre::Result;

use vetapp_base::agent_main;

use crate::keeper::Keeper;

mod dispatcher;
mod keeper;
mod metrics;
mod settings;
mod ticker;

#[cfg(test)]
mod test_utils;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // Logging is not initialised at this point, so, using `println!`
    println!("Keeper starting up...");

    agent_main::<Keeper>().await
}
