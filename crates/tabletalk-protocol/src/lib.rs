//! Wire protocol for the Table Talk relay.
//!
//! - **Types** ([`ClientId`], [`RoomCode`], [`Recipient`], ...): identity
//!   and addressing shared by every layer.
//! - **Questions** ([`Question`], [`AnswerSubmission`], [`RevealEntry`]):
//!   the game payloads.
//! - **Events** ([`ClientEvent`], [`ServerEvent`], [`Envelope`]): what
//!   travels on the wire.
//! - **Codec** ([`Codec`], [`JsonCodec`]): how envelopes become bytes.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Room (state transitions)
//! ```

mod codec;
mod error;
mod event;
mod question;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use event::{ClientEvent, Envelope, ServerEvent, PROTOCOL_VERSION};
pub use question::{AnswerSubmission, Question, QuestionOption, RevealEntry};
pub use types::{
    ClientId, ErrorReason, PlayerInfo, Recipient, RoomCode,
    ROOM_CODE_ALPHABET, ROOM_CODE_LEN,
};
