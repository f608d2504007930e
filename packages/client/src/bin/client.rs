//! roomcast terminal chat client.
//!
//! Connects to a roomcast server, joins the room and sends each line typed at
//! the prompt. Automatically reconnects on disconnection.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-client -- --name Alice --token alice
//! cargo run --bin roomcast-client -- -u ws://127.0.0.1:3000/ws -n Bob
//! ```

use std::time::Duration;

use clap::Parser;
use roomcast_client::{
    ClientConfig,
    runner::{DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_INTERVAL_SECS},
};
use roomcast_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "roomcast-client")]
#[command(about = "Terminal chat client with local echo and reconnection", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, env = "ROOMCAST_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Identity token announced to other members when joining
    #[arg(short = 't', long, env = "ROOMCAST_TOKEN")]
    token: Option<String>,

    /// Name shown next to your messages
    #[arg(short = 'n', long, default_value = "guest")]
    name: String,

    /// Connection attempts per outage before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_RECONNECT_ATTEMPTS)]
    max_reconnect_attempts: u32,

    /// Seconds to wait between connection attempts
    #[arg(long, default_value_t = DEFAULT_RECONNECT_INTERVAL_SECS)]
    reconnect_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = ClientConfig {
        url: args.url,
        identity_token: args.token,
        author_label: args.name,
        max_reconnect_attempts: args.max_reconnect_attempts,
        reconnect_interval: Duration::from_secs(args.reconnect_interval_secs),
    };

    // Run the client
    if let Err(e) = roomcast_client::run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
