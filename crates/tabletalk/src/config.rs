//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tabletalk_room::RoomConfig;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Settings for a [`TableTalkServer`](crate::TableTalkServer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// Connections outside any room that send nothing, not even a ping,
    /// for this long are closed. Hosts and players are never timed out.
    /// `None` disables the sweep.
    pub idle_timeout: Option<Duration>,

    /// Settings applied to every room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            idle_timeout: None,
            room: RoomConfig::default(),
        }
    }
}
