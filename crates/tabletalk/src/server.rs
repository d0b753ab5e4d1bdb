//! `TableTalkServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → room registry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tabletalk_protocol::JsonCodec;
use tabletalk_room::{CodeGenerator, RandomCodes, RoomConfig, RoomRegistry};
use tabletalk_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ServerConfig, TableTalkError};

/// Shared server state passed to each connection handler task.
///
/// Every registry call is a short synchronous step, so the lock is never
/// held across network I/O.
pub(crate) struct ServerState {
    pub(crate) registry: Mutex<RoomRegistry<Box<dyn CodeGenerator>>>,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
    start: Instant,
}

impl ServerState {
    /// Milliseconds since the server started.
    pub(crate) fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Builder for configuring and starting a Table Talk server.
///
/// # Example
///
/// ```rust,no_run
/// use tabletalk::prelude::*;
///
/// # async fn run() -> Result<(), TableTalkError> {
/// let server = TableTalkServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TableTalkServerBuilder {
    config: ServerConfig,
    codes: Option<Box<dyn CodeGenerator>>,
}

impl TableTalkServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            codes: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    /// Closes connections that stay silent this long without joining or
    /// hosting a room. Off unless set.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = Some(timeout);
        self
    }

    /// Sets the settings applied to every room.
    pub fn room_config(mut self, room: RoomConfig) -> Self {
        self.config.room = room;
        self
    }

    /// Overrides room code generation. Defaults to [`RandomCodes`].
    pub fn code_generator(mut self, codes: impl CodeGenerator) -> Self {
        self.codes = Some(Box::new(codes));
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// # Errors
    /// Returns [`TableTalkError::Transport`] if the address can't be bound.
    pub async fn build(self) -> Result<TableTalkServer, TableTalkError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let codes = self
            .codes
            .unwrap_or_else(|| Box::new(RandomCodes) as Box<dyn CodeGenerator>);
        let registry = RoomRegistry::with_codes(self.config.room.clone(), codes);

        let state = Arc::new(ServerState {
            registry: Mutex::new(registry),
            codec: JsonCodec,
            config: self.config,
            start: Instant::now(),
        });

        Ok(TableTalkServer { transport, state })
    }
}

impl Default for TableTalkServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Table Talk relay.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TableTalkServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl TableTalkServer {
    /// Creates a new builder.
    pub fn builder() -> TableTalkServerBuilder {
        TableTalkServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), TableTalkError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "table talk relay listening"),
            Err(_) => tracing::info!("table talk relay listening"),
        }

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
