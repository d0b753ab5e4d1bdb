//! Unified error type for the Table Talk server.

use tabletalk_protocol::ProtocolError;
use tabletalk_room::RoomError;
use tabletalk_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` conversions let `?` lift transport, protocol, and room
/// errors into this one type.
#[derive(Debug, thiserror::Error)]
pub enum TableTalkError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, forbidden, wrong phase).
    #[error(transparent)]
    Room(#[from] RoomError),
}
