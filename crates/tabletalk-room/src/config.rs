//! Room configuration and phase machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// When a question cycle moves to the reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevealPolicy {
    /// Only the host's `reveal-answers` reveals.
    #[default]
    Manual,

    /// Reveal as soon as every player in the roster has answered.
    /// The host can still reveal early.
    AutoOnFullCoverage,
}

/// Settings shared by every room a registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Reveal trigger for each question cycle.
    pub reveal_policy: RevealPolicy,

    /// Player names are truncated to this many characters.
    pub max_name_len: usize,

    /// Code draws attempted before `create_room` gives up.
    pub max_code_attempts: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            reveal_policy: RevealPolicy::Manual,
            max_name_len: 32,
            max_code_attempts: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a room is in its question cycle.
///
/// ```text
/// WaitingForPlayers → QuestionActive → AnswersRevealed
///                          ↑                 │
///                          └── broadcast ────┘
/// ```
///
/// A broadcast is accepted in every phase and always lands in
/// `QuestionActive`; the only terminal step is destroying the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    WaitingForPlayers,
    QuestionActive,
    AnswersRevealed,
}

impl Phase {
    /// Returns `true` while answers are being collected.
    pub fn accepts_answers(&self) -> bool {
        matches!(self, Self::QuestionActive)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WAITING_FOR_PLAYERS"),
            Self::QuestionActive => write!(f, "QUESTION_ACTIVE"),
            Self::AnswersRevealed => write!(f, "ANSWERS_REVEALED"),
        }
    }
}
