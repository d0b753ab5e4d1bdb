//! Room coordination for Table Talk.
//!
//! A room is one game session: a host, an ordered roster of players, and a
//! cycle of question broadcast → answer collection → reveal.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: owns every room, indexes connections, delivers events
//! - [`Room`]: the per-room state machine
//! - [`Phase`]: where a room is in its question cycle
//! - [`RoomConfig`] / [`RevealPolicy`]: room settings
//! - [`CodeGenerator`]: pluggable source of room codes

mod code;
mod config;
mod error;
mod manager;
mod room;

pub use code::{CodeGenerator, RandomCodes, ScriptedCodes};
pub use config::{Phase, RevealPolicy, RoomConfig};
pub use error::RoomError;
pub use manager::{ClientSender, Membership, Role, RoomRegistry};
pub use room::{Answer, Outbound, Player, RevealResult, Room};
