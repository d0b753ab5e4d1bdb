//! Error types for the room layer.

use tabletalk_protocol::{ClientId, ErrorReason, RoomCode};

use crate::Phase;

/// Errors that can occur during room operations.
///
/// Every variant is reported back to the originating client; none of them
/// is fatal to the server.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (stale or garbled code, or already closed).
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// A non-host called a host-only operation.
    #[error("only the host can {0}")]
    Forbidden(&'static str),

    /// The join could not complete.
    #[error("join rejected: {0}")]
    JoinRejected(String),

    /// No unused room code was found.
    #[error("no free room code after {0} attempts")]
    CapacityExhausted(usize),

    /// The room's phase doesn't allow this operation.
    #[error("cannot {action} while room is {phase}")]
    InvalidPhase { phase: Phase, action: &'static str },

    /// The caller is not a player in this room.
    #[error("{0} is not a player in room {1}")]
    NotInRoom(ClientId, RoomCode),

    /// The caller already hosts or plays in a room.
    #[error("{0} is already in room {1}")]
    AlreadyInRoom(ClientId, RoomCode),

    /// The broadcast question is malformed.
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
}

impl RoomError {
    /// Returns the wire category for this error.
    pub fn reason(&self) -> ErrorReason {
        match self {
            Self::NotFound(_) => ErrorReason::RoomNotFound,
            Self::Forbidden(_) => ErrorReason::Forbidden,
            Self::JoinRejected(_) => ErrorReason::JoinRejected,
            Self::CapacityExhausted(_) => ErrorReason::CapacityExhausted,
            Self::InvalidPhase { .. } => ErrorReason::InvalidPhase,
            Self::NotInRoom(..) => ErrorReason::NotInRoom,
            Self::AlreadyInRoom(..) => ErrorReason::AlreadyInRoom,
            Self::InvalidQuestion(_) => ErrorReason::InvalidQuestion,
        }
    }
}
