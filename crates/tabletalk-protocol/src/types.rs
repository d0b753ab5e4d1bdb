//! Identity and addressing types shared by every layer.

use std::fmt;

use serde::{Deserialize, Serialize};
use tabletalk_transport::ConnectionId;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Connection-scoped identifier for a host or player.
///
/// Stable for the lifetime of the connection that owns it. Serialized as a
/// plain number (`42`, not `{"0":42}`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

impl From<ConnectionId> for ClientId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

/// Number of characters in a room code.
pub const ROOM_CODE_LEN: usize = 4;

/// Characters a room code is drawn from.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A room's short, human-typeable identifier (e.g. `AB3K`).
///
/// Construction trims and uppercases, so lookups are case-insensitive no
/// matter how the client typed the code. A code that is not
/// [well-formed](Self::is_well_formed) is still representable; it simply
/// never matches an active room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Returns the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code has the right length and only uses
    /// characters from [`ROOM_CODE_ALPHABET`].
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == ROOM_CODE_LEN
            && self.0.bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b))
    }
}

impl From<String> for RoomCode {
    fn from(raw: String) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl From<&str> for RoomCode {
    fn from(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public view of a player, as announced to the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: ClientId,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Addressing for a server event produced by a room transition.
///
/// The room state machine returns `(Recipient, ServerEvent)` pairs; the
/// registry resolves each recipient against the room's current roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// The room's host connection only.
    Host,

    /// One specific connection.
    Client(ClientId),

    /// Every player currently in the room (not the host).
    Players,

    /// The host and every player.
    Everyone,

    /// The host and every player except the given one.
    EveryoneExcept(ClientId),
}

// ---------------------------------------------------------------------------
// ErrorReason
// ---------------------------------------------------------------------------

/// Machine-readable category carried by the `error` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorReason {
    /// The room code is stale or garbled.
    RoomNotFound,
    /// A non-host attempted a host-only action.
    Forbidden,
    /// The join could not complete.
    JoinRejected,
    /// No free room code could be found.
    CapacityExhausted,
    /// The room is not in a phase that allows the operation.
    InvalidPhase,
    /// The caller is not a member of the room.
    NotInRoom,
    /// The caller already belongs to a room.
    AlreadyInRoom,
    /// The broadcast question is malformed.
    InvalidQuestion,
    /// The frame could not be decoded.
    BadRequest,
}
