//! Room registry: creates rooms, routes connections to them, and delivers
//! the events each transition produces.

use std::collections::HashMap;

use tabletalk_protocol::{
    AnswerSubmission, ClientId, PlayerInfo, Question, RoomCode, ServerEvent,
};
use tokio::sync::mpsc;

use crate::room::Outbound;
use crate::{
    CodeGenerator, RandomCodes, RevealResult, Room, RoomConfig, RoomError,
};

/// Channel for delivering server events to one connection's handler.
pub type ClientSender = mpsc::UnboundedSender<ServerEvent>;

/// What a connection is to the room it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    Player,
}

/// A connection's current room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub code: RoomCode,
    pub role: Role,
}

/// Owns every active room.
///
/// All methods are synchronous and never suspend, so each call is one
/// atomic step even when the registry sits behind a lock shared by many
/// connection tasks. Rooms are independent; nothing here crosses rooms.
pub struct RoomRegistry<C: CodeGenerator = RandomCodes> {
    config: RoomConfig,
    codes: C,

    /// Active rooms, keyed by normalized code.
    rooms: HashMap<RoomCode, Room>,

    /// Each connection is in at most one room, as host or player.
    memberships: HashMap<ClientId, Membership>,

    /// Outbound channels for connected clients.
    clients: HashMap<ClientId, ClientSender>,
}

impl RoomRegistry<RandomCodes> {
    /// Creates an empty registry that draws random room codes.
    pub fn new(config: RoomConfig) -> Self {
        Self::with_codes(config, RandomCodes)
    }
}

impl<C: CodeGenerator> RoomRegistry<C> {
    /// Creates an empty registry using the given code source.
    pub fn with_codes(config: RoomConfig, codes: C) -> Self {
        Self {
            config,
            codes,
            rooms: HashMap::new(),
            memberships: HashMap::new(),
            clients: HashMap::new(),
        }
    }

    // -- Connections -------------------------------------------------------

    /// Registers a connection's outbound channel.
    pub fn connect(&mut self, client: ClientId, sender: ClientSender) {
        self.clients.insert(client, sender);
    }

    /// Handles a connection going away.
    ///
    /// A host takes its room down with it; a player just leaves. Safe to
    /// call any number of times for the same connection.
    pub fn disconnect(&mut self, client: ClientId) {
        match self.memberships.get(&client).cloned() {
            Some(Membership {
                code,
                role: Role::Host,
            }) => {
                self.destroy_room(&code);
            }
            Some(Membership {
                code,
                role: Role::Player,
            }) => {
                if let Err(e) = self.leave_room(client, &code) {
                    tracing::debug!(%client, error = %e, "leave on disconnect failed");
                }
            }
            None => {}
        }
        if self.clients.remove(&client).is_some() {
            tracing::debug!(%client, "client disconnected");
        }
    }

    /// Returns the room a connection currently belongs to.
    pub fn membership(&self, client: ClientId) -> Option<&Membership> {
        self.memberships.get(&client)
    }

    // -- Rooms -------------------------------------------------------------

    /// Opens a room hosted by `host` and sends it `room-created`.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] if `host` already belongs to a room
    /// - [`RoomError::CapacityExhausted`] if every drawn code was taken
    pub fn create_room(
        &mut self,
        host: ClientId,
        host_name: &str,
    ) -> Result<RoomCode, RoomError> {
        if let Some(existing) = self.memberships.get(&host) {
            return Err(RoomError::AlreadyInRoom(host, existing.code.clone()));
        }

        let attempts = self.config.max_code_attempts;
        let code = (0..attempts)
            .map(|_| self.codes.generate())
            .find(|code| !self.rooms.contains_key(code))
            .ok_or_else(|| {
                tracing::warn!(
                    attempts,
                    active = self.rooms.len(),
                    "room code space exhausted"
                );
                RoomError::CapacityExhausted(attempts)
            })?;

        let room = Room::new(code.clone(), host, host_name.trim(), &self.config);
        self.rooms.insert(code.clone(), room);
        self.memberships.insert(
            host,
            Membership {
                code: code.clone(),
                role: Role::Host,
            },
        );
        tracing::info!(room = %code, %host, "room created");

        self.send_to(
            host,
            ServerEvent::RoomCreated {
                room_code: code.clone(),
            },
        );
        Ok(code)
    }

    /// Looks up a room by code. Codes that could never have been issued
    /// are rejected without a lookup.
    pub fn get_room(&self, code: &RoomCode) -> Result<&Room, RoomError> {
        check_code(code)?;
        self.rooms
            .get(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Closes a room and tells its players the host left.
    ///
    /// Returns `false` if the room was already gone.
    pub fn destroy_room(&mut self, code: &RoomCode) -> bool {
        let Some(room) = self.rooms.remove(code) else {
            return false;
        };

        for player in room.players() {
            self.memberships.remove(&player.id);
            self.send_to(player.id, ServerEvent::HostDisconnected);
        }
        if self
            .memberships
            .get(&room.host())
            .is_some_and(|m| m.code == *code)
        {
            self.memberships.remove(&room.host());
        }

        tracing::info!(
            room = %code,
            players = room.players().len(),
            "room destroyed"
        );
        true
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    // -- Room operations ---------------------------------------------------

    /// Adds `client` to the room as a player.
    pub fn join_room(
        &mut self,
        client: ClientId,
        code: &RoomCode,
        name: &str,
    ) -> Result<PlayerInfo, RoomError> {
        if let Some(existing) = self.memberships.get(&client) {
            return Err(RoomError::AlreadyInRoom(client, existing.code.clone()));
        }
        check_code(code)?;
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        let (info, out) = room.join(client, name)?;
        self.memberships.insert(
            client,
            Membership {
                code: code.clone(),
                role: Role::Player,
            },
        );
        deliver(&self.clients, room, out);
        Ok(info)
    }

    /// Removes `client` from the room. The host leaving closes the room.
    pub fn leave_room(
        &mut self,
        client: ClientId,
        code: &RoomCode,
    ) -> Result<(), RoomError> {
        check_code(code)?;
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;

        if room.is_host(client) {
            self.destroy_room(code);
            return Ok(());
        }

        let out = room.leave(client)?;
        self.memberships.remove(&client);
        deliver(&self.clients, room, out);
        Ok(())
    }

    /// Host only: starts a new question cycle.
    pub fn broadcast_question(
        &mut self,
        client: ClientId,
        code: &RoomCode,
        question: Question,
    ) -> Result<(), RoomError> {
        check_code(code)?;
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let out = room.broadcast_question(client, question)?;
        deliver(&self.clients, room, out);
        Ok(())
    }

    /// Player: records an answer for the active question.
    pub fn submit_answer(
        &mut self,
        client: ClientId,
        code: &RoomCode,
        answer: AnswerSubmission,
    ) -> Result<(), RoomError> {
        check_code(code)?;
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let out = room.submit_answer(client, answer)?;
        deliver(&self.clients, room, out);
        Ok(())
    }

    /// Host only: reveals the collected answers.
    pub fn reveal_answers(
        &mut self,
        client: ClientId,
        code: &RoomCode,
        host_answer: Option<&AnswerSubmission>,
    ) -> Result<RevealResult, RoomError> {
        check_code(code)?;
        let room = self
            .rooms
            .get_mut(code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        let (result, out) = room.reveal_answers(client, host_answer)?;
        deliver(&self.clients, room, out);
        Ok(result)
    }

    /// Sends one event to one connection. Dropped silently if the
    /// connection is gone.
    pub fn send_to(&self, client: ClientId, event: ServerEvent) {
        if let Some(sender) = self.clients.get(&client) {
            let _ = sender.send(event);
        }
    }
}

fn check_code(code: &RoomCode) -> Result<(), RoomError> {
    if code.is_well_formed() {
        Ok(())
    } else {
        tracing::debug!(room = %code, "malformed room code");
        Err(RoomError::NotFound(code.clone()))
    }
}

/// Resolves each recipient against the room's roster and pushes the
/// events onto the matching channels, preserving order.
fn deliver(
    clients: &HashMap<ClientId, ClientSender>,
    room: &Room,
    out: Outbound,
) {
    for (recipient, event) in out {
        let targets = room.recipients(recipient);
        let Some((last, rest)) = targets.split_last() else {
            continue;
        };
        for id in rest {
            if let Some(sender) = clients.get(id) {
                let _ = sender.send(event.clone());
            }
        }
        if let Some(sender) = clients.get(last) {
            let _ = sender.send(event);
        }
    }
}

impl Default for RoomRegistry<RandomCodes> {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
