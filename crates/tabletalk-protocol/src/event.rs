//! The relay's event contract and the envelope that carries it.
//!
//! Events are internally tagged by `type` with kebab-case names, and their
//! fields are camelCase, so a join looks like:
//!
//! ```json
//! {"type": "join-room", "roomCode": "AB3K", "playerName": "Alice"}
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    AnswerSubmission, ClientId, ErrorReason, PlayerInfo, Question,
    RevealEntry, RoomCode,
};

/// Protocol version announced in the `connected` event.
pub const PROTOCOL_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Events a host or player client can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Open a new room with the sender as host.
    CreateRoom { host_name: String },

    /// Join an existing room as a player.
    JoinRoom {
        room_code: RoomCode,
        player_name: String,
    },

    /// Leave a room. A host leaving closes the room.
    LeaveRoom { room_code: RoomCode },

    /// Host only: start a new question cycle.
    BroadcastQuestion {
        room_code: RoomCode,
        question: Question,
    },

    /// Player: choose an option for the active question.
    SubmitAnswer {
        room_code: RoomCode,
        answer: AnswerSubmission,
    },

    /// Host only: disclose the collected answers.
    RevealAnswers {
        room_code: RoomCode,
        /// The host's own pick, used to pair a matching player.
        #[serde(default)]
        host_answer: Option<AnswerSubmission>,
    },

    /// Keep-alive. Echoed back as `heartbeat-ack`.
    Heartbeat { client_time: u64 },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Events the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Sent once, right after the connection is accepted.
    Connected {
        client_id: ClientId,
        protocol_version: u32,
    },

    /// To the host: the room exists and can be shared.
    RoomCreated { room_code: RoomCode },

    /// To the joining player.
    JoinedRoom {
        room_code: RoomCode,
        player_name: String,
        /// Display name the host gave when creating the room.
        host_name: String,
        player: PlayerInfo,
        players: Vec<PlayerInfo>,
    },

    /// To the would-be player when a join fails.
    JoinError { message: String },

    /// To everyone else in the room.
    PlayerJoined {
        player: PlayerInfo,
        player_count: usize,
    },

    /// To everyone remaining in the room.
    PlayerLeft {
        player: PlayerInfo,
        player_count: usize,
    },

    /// To every player when a question cycle starts.
    NewQuestion {
        question: Question,
        question_number: u64,
    },

    /// To the host after each submission. Counts only, never content.
    AnswerReceived {
        answered_count: usize,
        total_players: usize,
    },

    /// To the submitting player only.
    AnswerConfirmed {
        question_number: u64,
        selection_index: usize,
    },

    /// To everyone when the cycle's answers are disclosed.
    AnswersRevealed {
        question: Question,
        results: Vec<RevealEntry>,
        question_number: u64,
    },

    /// To the player whose answer matched the host's.
    YourAnswerRevealed {
        player_name: String,
        answer: AnswerSubmission,
    },

    /// To every player when the host's connection goes away.
    HostDisconnected,

    /// Reply to `heartbeat`.
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// Any rejected operation other than a join.
    Error {
        reason: ErrorReason,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Frame wrapper. The event's fields sit at the top level next to `seq`
/// and `timestamp`, which clients may omit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<E> {
    /// Per-connection sequence number set by the sender.
    #[serde(default)]
    pub seq: u64,

    /// Milliseconds since the sender started.
    #[serde(default)]
    pub timestamp: u64,

    #[serde(flatten)]
    pub event: E,
}

impl<E> Envelope<E> {
    pub fn new(seq: u64, timestamp: u64, event: E) -> Self {
        Self {
            seq,
            timestamp,
            event,
        }
    }
}
