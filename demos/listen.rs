// SPDX-License-Identifier: MPL-2.0

//! Demo program: Print appliance state pushed by the Miele event stream.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example listen -- <url> <access-token>
//! ```
//!
//! # Example
//!
//! ```bash
//! RUST_LOG=miele_events=debug cargo run --example listen -- \
//!     https://api.mcs3.miele.com/v1/devices/all/events my-access-token
//! ```
//!
//! Every received chunk is logged by [`VerboseClient`] and the decoded
//! devices are printed. Press Ctrl+C to stop.

use std::env;

use miele_events::protocol::{HttpClient, VerboseClient};
use miele_events::{Error, MieleService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "miele_events=info".into());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        eprintln!("Usage: {} <url> <access-token>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!(
            "  cargo run --example listen -- https://api.mcs3.miele.com/v1/devices/all/events token"
        );
        std::process::exit(1);
    }

    let url = args[1].parse()?;
    let secret = &args[2];

    let service = MieleService::new(VerboseClient::new(HttpClient::new()?));

    println!("Listening on {url}...");

    service.subscribe(&url, secret, |result| match result {
        Ok(devices) if devices.is_empty() => println!("No running or ended programs"),
        Ok(devices) => {
            for device in devices {
                println!(
                    "{} ({}): {} {} - water {}",
                    device.id(),
                    device.appliance_type(),
                    device.program(),
                    device.program_state(),
                    device.water_consumption(),
                );
            }
        }
        Err(Error::Connectivity) => eprintln!("Connection lost, press Ctrl+C to exit"),
        Err(e) => eprintln!("Skipped chunk: {e}"),
    });

    tokio::signal::ctrl_c().await?;
    println!("Stopping...");

    Ok(())
}
