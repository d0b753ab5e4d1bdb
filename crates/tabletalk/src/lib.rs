//! # Table Talk
//!
//! Room relay for in-person party games. One host device opens a room and
//! gets a four-character code; players join with the code and a display
//! name. The host pushes questions, players answer privately, and the host
//! reveals everyone's answers at once.
//!
//! The server holds no game content. It keeps rooms, rosters, and the
//! answers for the active question in memory, and fans events out to the
//! right connections.
//!
//! ## Deployment
//!
//! The listener only accepts WebSocket upgrades; it does not serve files.
//! Host the browser client bundle from a separate static file server or
//! reverse proxy, and point it at this relay's address.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabletalk::prelude::*;
//!
//! # async fn run() -> Result<(), TableTalkError> {
//! let server = TableTalkServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .room_config(RoomConfig {
//!         reveal_policy: RevealPolicy::AutoOnFullCoverage,
//!         ..RoomConfig::default()
//!     })
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod logging;
mod server;

pub use config::{DEFAULT_BIND_ADDR, ServerConfig};
pub use error::TableTalkError;
pub use logging::setup_logger;
pub use server::{TableTalkServer, TableTalkServerBuilder};

pub use tabletalk_protocol as protocol;
pub use tabletalk_room as room;
pub use tabletalk_transport as transport;

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{ServerConfig, TableTalkError, TableTalkServer, TableTalkServerBuilder};
    pub use tabletalk_protocol::{
        AnswerSubmission, ClientEvent, ClientId, Codec, Envelope, ErrorReason,
        JsonCodec, PlayerInfo, Question, QuestionOption, RevealEntry, RoomCode,
        ServerEvent, PROTOCOL_VERSION,
    };
    pub use tabletalk_room::{
        CodeGenerator, Phase, RandomCodes, RevealPolicy, RoomConfig, RoomError,
        ScriptedCodes,
    };
}
