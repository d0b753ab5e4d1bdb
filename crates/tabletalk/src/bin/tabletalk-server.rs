//! Table Talk relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tabletalk-server
//! cargo run --bin tabletalk-server -- --bind 0.0.0.0:8080 --auto-reveal
//! ```

use std::time::Duration;

use clap::Parser;
use tabletalk::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "tabletalk-server")]
#[command(about = "WebSocket room relay for in-person party games", long_about = None)]
struct Args {
    /// Address to bind the WebSocket listener to
    #[arg(short, long, env = "TABLETALK_BIND", default_value = tabletalk::DEFAULT_BIND_ADDR)]
    bind: String,

    /// Reveal automatically once every player has answered
    #[arg(long, env = "TABLETALK_AUTO_REVEAL")]
    auto_reveal: bool,

    /// Close connections that send nothing for this many seconds without
    /// joining a room (off by default)
    #[arg(long, env = "TABLETALK_IDLE_TIMEOUT_SECS")]
    idle_timeout_secs: Option<u64>,

    /// Truncate player names to this many characters
    #[arg(long, env = "TABLETALK_MAX_NAME_LEN", default_value_t = 32)]
    max_name_len: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let reveal_policy = if self.auto_reveal {
            RevealPolicy::AutoOnFullCoverage
        } else {
            RevealPolicy::Manual
        };
        ServerConfig {
            bind_addr: self.bind,
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
            room: RoomConfig {
                reveal_policy,
                max_name_len: self.max_name_len,
                ..RoomConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), TableTalkError> {
    tabletalk::setup_logger(&env!("CARGO_BIN_NAME").replace('-', "_"), "info");

    let config = Args::parse().into_config();
    tracing::debug!(?config, "starting");

    let server = TableTalkServer::builder().config(config).build().await?;
    server.run().await
}
