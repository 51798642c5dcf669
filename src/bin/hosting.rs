//! Hosting server binary.
//!
//! Opens rooms over HTTP and relays each room's traffic over WebSockets.

use clap::Parser;
use turfwar::hosting::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    turfwar::log();
    let config = HostingConfig::parse();
    Server::run(config).await?;
    Ok(())
}
