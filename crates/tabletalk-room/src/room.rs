//! The per-room state machine: roster, question cycle, and reveal.
//!
//! Every operation is a single synchronous transition. It validates first,
//! mutates second, and returns the events to deliver as
//! `(Recipient, ServerEvent)` pairs. Nothing here touches the network, so a
//! failed operation leaves the room exactly as it was.

use std::collections::HashMap;

use tabletalk_protocol::{
    AnswerSubmission, ClientId, PlayerInfo, Question, Recipient, RevealEntry,
    RoomCode, ServerEvent,
};

use crate::{Phase, RevealPolicy, RoomConfig, RoomError};

/// Events produced by one transition, in delivery order.
pub type Outbound = Vec<(Recipient, ServerEvent)>;

/// A player in a room's roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: ClientId,
    pub name: String,
    /// Position in the room's join sequence. Never reused.
    pub join_order: u64,
}

impl Player {
    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// A stored answer for the active question cycle.
///
/// Name and join order are captured at submission so the answer can still
/// be revealed after its player leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub player_id: ClientId,
    pub player_name: String,
    pub join_order: u64,
    pub text: String,
    pub value: String,
    pub selection_index: usize,
    /// Room-local submission counter. Display ordering only.
    pub submitted_at: u64,
}

impl Answer {
    fn submission(&self) -> AnswerSubmission {
        AnswerSubmission {
            text: self.text.clone(),
            value: self.value.clone(),
            index: self.selection_index,
        }
    }
}

/// Outcome of a reveal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealResult {
    pub question_number: u64,
    /// One entry per submitted answer, in player join order.
    pub results: Vec<RevealEntry>,
    /// The player paired with the host's answer, if any.
    pub matched: Option<ClientId>,
}

/// One active game session.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    host: ClientId,
    host_name: String,
    reveal_policy: RevealPolicy,
    max_name_len: usize,
    phase: Phase,
    players: Vec<Player>,
    current_question: Option<Question>,
    question_number: u64,
    answers: HashMap<ClientId, Answer>,
    last_reveal: Option<RevealResult>,
    next_join_order: u64,
    next_submission: u64,
}

impl Room {
    /// Creates an empty room in `WaitingForPlayers`.
    pub fn new(
        code: RoomCode,
        host: ClientId,
        host_name: impl Into<String>,
        config: &RoomConfig,
    ) -> Self {
        Self {
            code,
            host,
            host_name: host_name.into(),
            reveal_policy: config.reveal_policy,
            max_name_len: config.max_name_len,
            phase: Phase::WaitingForPlayers,
            players: Vec::new(),
            current_question: None,
            question_number: 0,
            answers: HashMap::new(),
            last_reveal: None,
            next_join_order: 0,
            next_submission: 0,
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn host(&self) -> ClientId {
        self.host
    }

    pub fn host_name(&self) -> &str {
        &self.host_name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: ClientId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// 1-based number of the current question cycle; 0 before the first.
    pub fn question_number(&self) -> u64 {
        self.question_number
    }

    pub fn answers(&self) -> &HashMap<ClientId, Answer> {
        &self.answers
    }

    pub fn is_host(&self, id: ClientId) -> bool {
        self.host == id
    }

    /// Number of current roster members who have answered.
    pub fn answered_count(&self) -> usize {
        self.players
            .iter()
            .filter(|p| self.answers.contains_key(&p.id))
            .count()
    }

    /// Resolves a recipient against the current roster.
    pub fn recipients(&self, recipient: Recipient) -> Vec<ClientId> {
        let players = self.players.iter().map(|p| p.id);
        match recipient {
            Recipient::Host => vec![self.host],
            Recipient::Client(id) => vec![id],
            Recipient::Players => players.collect(),
            Recipient::Everyone => {
                std::iter::once(self.host).chain(players).collect()
            }
            Recipient::EveryoneExcept(excluded) => std::iter::once(self.host)
                .chain(players)
                .filter(|id| *id != excluded)
                .collect(),
        }
    }

    // -- Roster ------------------------------------------------------------

    /// Adds a player.
    ///
    /// Names are trimmed and truncated; duplicates are allowed. A player
    /// joining mid-question receives the active question straight away.
    pub fn join(
        &mut self,
        id: ClientId,
        name: &str,
    ) -> Result<(PlayerInfo, Outbound), RoomError> {
        if self.is_host(id) || self.player(id).is_some() {
            return Err(RoomError::AlreadyInRoom(id, self.code.clone()));
        }
        let name: String = name.trim().chars().take(self.max_name_len).collect();
        if name.is_empty() {
            return Err(RoomError::JoinRejected(
                "player name must not be empty".into(),
            ));
        }

        let player = Player {
            id,
            name,
            join_order: self.next_join_order,
        };
        self.next_join_order += 1;
        let info = player.info();
        self.players.push(player);

        tracing::info!(
            room = %self.code,
            player = %id,
            players = self.players.len(),
            "player joined"
        );

        let mut out = vec![
            (
                Recipient::Client(id),
                ServerEvent::JoinedRoom {
                    room_code: self.code.clone(),
                    player_name: info.name.clone(),
                    host_name: self.host_name.clone(),
                    player: info.clone(),
                    players: self.players.iter().map(Player::info).collect(),
                },
            ),
            (
                Recipient::EveryoneExcept(id),
                ServerEvent::PlayerJoined {
                    player: info.clone(),
                    player_count: self.players.len(),
                },
            ),
        ];

        if self.phase.accepts_answers() {
            if let Some(question) = &self.current_question {
                out.push((
                    Recipient::Client(id),
                    ServerEvent::NewQuestion {
                        question: question.clone(),
                        question_number: self.question_number,
                    },
                ));
            }
        }

        Ok((info, out))
    }

    /// Removes a player. An answer already submitted for the active
    /// question is kept and still revealed.
    pub fn leave(&mut self, id: ClientId) -> Result<Outbound, RoomError> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| RoomError::NotInRoom(id, self.code.clone()))?;
        let player = self.players.remove(idx);

        tracing::info!(
            room = %self.code,
            player = %id,
            players = self.players.len(),
            "player left"
        );

        let mut out = vec![(
            Recipient::Everyone,
            ServerEvent::PlayerLeft {
                player: player.info(),
                player_count: self.players.len(),
            },
        )];

        if self.phase.accepts_answers() {
            out.push((Recipient::Host, self.answer_progress()));
            if self.should_auto_reveal() {
                let (_, reveal_out) = self.reveal(None);
                out.extend(reveal_out);
            }
        }

        Ok(out)
    }

    // -- Question cycle ----------------------------------------------------

    /// Host only. Starts a new cycle: the last broadcast always wins and
    /// any answers from the previous cycle are discarded.
    pub fn broadcast_question(
        &mut self,
        caller: ClientId,
        question: Question,
    ) -> Result<Outbound, RoomError> {
        if !self.is_host(caller) {
            tracing::warn!(room = %self.code, %caller, "non-host broadcast rejected");
            return Err(RoomError::Forbidden("broadcast a question"));
        }
        if question.options.is_empty() {
            return Err(RoomError::InvalidQuestion(
                "a question needs at least one option".into(),
            ));
        }

        self.answers.clear();
        self.last_reveal = None;
        self.question_number += 1;
        self.phase = Phase::QuestionActive;
        self.current_question = Some(question.clone());

        tracing::info!(
            room = %self.code,
            question_number = self.question_number,
            options = question.options.len(),
            "question broadcast"
        );

        Ok(vec![(
            Recipient::Players,
            ServerEvent::NewQuestion {
                question,
                question_number: self.question_number,
            },
        )])
    }

    /// Player only. Upserts the caller's answer for the active question.
    ///
    /// The host gets a running count and the caller gets a confirmation;
    /// nobody else learns anything until the reveal.
    pub fn submit_answer(
        &mut self,
        caller: ClientId,
        submission: AnswerSubmission,
    ) -> Result<Outbound, RoomError> {
        if !self.phase.accepts_answers() {
            return Err(RoomError::InvalidPhase {
                phase: self.phase,
                action: "submit an answer",
            });
        }
        let player = self
            .player(caller)
            .ok_or_else(|| RoomError::NotInRoom(caller, self.code.clone()))?;

        let answer = Answer {
            player_id: caller,
            player_name: player.name.clone(),
            join_order: player.join_order,
            text: submission.text,
            value: submission.value,
            selection_index: submission.index,
            submitted_at: self.next_submission,
        };
        self.next_submission += 1;
        let selection_index = answer.selection_index;
        let resubmitted = self.answers.insert(caller, answer).is_some();

        tracing::debug!(
            room = %self.code,
            player = %caller,
            resubmitted,
            answered = self.answered_count(),
            total = self.players.len(),
            "answer recorded"
        );

        let mut out = vec![
            (Recipient::Host, self.answer_progress()),
            (
                Recipient::Client(caller),
                ServerEvent::AnswerConfirmed {
                    question_number: self.question_number,
                    selection_index,
                },
            ),
        ];

        if self.should_auto_reveal() {
            let (_, reveal_out) = self.reveal(None);
            out.extend(reveal_out);
        }

        Ok(out)
    }

    /// Host only. Discloses every collected answer to the whole room.
    ///
    /// Repeating a reveal before the next broadcast returns the same result
    /// and emits nothing.
    pub fn reveal_answers(
        &mut self,
        caller: ClientId,
        host_answer: Option<&AnswerSubmission>,
    ) -> Result<(RevealResult, Outbound), RoomError> {
        if !self.is_host(caller) {
            tracing::warn!(room = %self.code, %caller, "non-host reveal rejected");
            return Err(RoomError::Forbidden("reveal answers"));
        }
        match self.phase {
            Phase::WaitingForPlayers => Err(RoomError::InvalidPhase {
                phase: self.phase,
                action: "reveal answers",
            }),
            Phase::AnswersRevealed => {
                let result = self
                    .last_reveal
                    .clone()
                    .unwrap_or_else(|| self.reveal_result(None));
                Ok((result, Vec::new()))
            }
            Phase::QuestionActive => Ok(self.reveal(host_answer)),
        }
    }

    // -- Internals ---------------------------------------------------------

    fn answer_progress(&self) -> ServerEvent {
        ServerEvent::AnswerReceived {
            answered_count: self.answered_count(),
            total_players: self.players.len(),
        }
    }

    fn should_auto_reveal(&self) -> bool {
        self.reveal_policy == RevealPolicy::AutoOnFullCoverage
            && self.phase.accepts_answers()
            && !self.players.is_empty()
            && self.answered_count() == self.players.len()
    }

    /// Builds the reveal payload without changing phase.
    fn reveal_result(
        &self,
        host_answer: Option<&AnswerSubmission>,
    ) -> RevealResult {
        let mut answers: Vec<&Answer> = self.answers.values().collect();
        answers.sort_by_key(|a| a.join_order);

        // Pairing: first present player, in join order, whose value equals
        // the host's.
        let matched = host_answer.and_then(|host| {
            answers
                .iter()
                .find(|a| {
                    a.value == host.value && self.player(a.player_id).is_some()
                })
                .map(|a| a.player_id)
        });

        RevealResult {
            question_number: self.question_number,
            results: answers
                .iter()
                .map(|a| RevealEntry {
                    player_name: a.player_name.clone(),
                    answer: a.submission(),
                })
                .collect(),
            matched,
        }
    }

    fn reveal(
        &mut self,
        host_answer: Option<&AnswerSubmission>,
    ) -> (RevealResult, Outbound) {
        let result = self.reveal_result(host_answer);
        self.phase = Phase::AnswersRevealed;
        self.last_reveal = Some(result.clone());

        tracing::info!(
            room = %self.code,
            question_number = self.question_number,
            answers = result.results.len(),
            matched = result.matched.is_some(),
            "answers revealed"
        );

        let mut out = Vec::with_capacity(2);
        if let Some(question) = &self.current_question {
            out.push((
                Recipient::Everyone,
                ServerEvent::AnswersRevealed {
                    question: question.clone(),
                    results: result.results.clone(),
                    question_number: self.question_number,
                },
            ));
        }
        if let Some(matched) = result.matched {
            if let Some(answer) = self.answers.get(&matched) {
                out.push((
                    Recipient::Client(matched),
                    ServerEvent::YourAnswerRevealed {
                        player_name: answer.player_name.clone(),
                        answer: answer.submission(),
                    },
                ));
            }
        }

        (result, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabletalk_protocol::QuestionOption;

    const HOST: ClientId = ClientId(100);

    fn cid(id: u64) -> ClientId {
        ClientId(id)
    }

    fn room_with(policy: RevealPolicy) -> Room {
        let config = RoomConfig {
            reveal_policy: policy,
            ..RoomConfig::default()
        };
        Room::new(RoomCode::from("AB3K"), HOST, "Host", &config)
    }

    fn room() -> Room {
        room_with(RevealPolicy::Manual)
    }

    fn question() -> Question {
        Question::either_or(
            "Pizza or Tacos?",
            QuestionOption::new("Pizza", "A"),
            QuestionOption::new("Tacos", "B"),
        )
    }

    fn pick(value: &str) -> AnswerSubmission {
        AnswerSubmission::new(value, value, 0)
    }

    /// Room with Alice (1) and Bob (2) and an active question.
    fn active_room(policy: RevealPolicy) -> Room {
        let mut room = room_with(policy);
        room.join(cid(1), "Alice").unwrap();
        room.join(cid(2), "Bob").unwrap();
        room.broadcast_question(HOST, question()).unwrap();
        room
    }

    fn events_for(out: &Outbound, room: &Room, id: ClientId) -> Vec<ServerEvent> {
        out.iter()
            .filter(|(r, _)| room.recipients(*r).contains(&id))
            .map(|(_, e)| e.clone())
            .collect()
    }

    // =====================================================================
    // join / leave
    // =====================================================================

    #[test]
    fn test_new_room_is_waiting_and_empty() {
        let room = room();
        assert_eq!(room.phase(), Phase::WaitingForPlayers);
        assert!(room.players().is_empty());
        assert!(room.current_question().is_none());
    }

    #[test]
    fn test_join_appends_in_order_and_announces_count() {
        let mut room = room();
        room.join(cid(1), "Alice").unwrap();
        let (info, out) = room.join(cid(2), "Bob").unwrap();

        assert_eq!(info.name, "Bob");
        let names: Vec<_> = room.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);

        let to_alice = events_for(&out, &room, cid(1));
        assert!(matches!(
            to_alice.as_slice(),
            [ServerEvent::PlayerJoined { player_count: 2, .. }]
        ));
        let to_bob = events_for(&out, &room, cid(2));
        assert!(matches!(to_bob.as_slice(), [ServerEvent::JoinedRoom { .. }]));
    }

    #[test]
    fn test_join_tells_player_who_hosts() {
        let mut room = room();
        let (_, out) = room.join(cid(1), "Alice").unwrap();

        let to_alice = events_for(&out, &room, cid(1));
        assert!(matches!(
            to_alice.as_slice(),
            [ServerEvent::JoinedRoom { host_name, .. }] if host_name == room.host_name()
        ));
        assert_eq!(room.host_name(), "Host");
    }

    #[test]
    fn test_join_allows_duplicate_names() {
        let mut room = room();
        room.join(cid(1), "Sam").unwrap();
        room.join(cid(2), "Sam").unwrap();
        assert_eq!(room.players().len(), 2);
    }

    #[test]
    fn test_join_trims_and_truncates_name() {
        let config = RoomConfig {
            max_name_len: 4,
            ..RoomConfig::default()
        };
        let mut room = Room::new(RoomCode::from("AB3K"), HOST, "Host", &config);
        let (info, _) = room.join(cid(1), "  Alexandra ").unwrap();
        assert_eq!(info.name, "Alex");
    }

    #[test]
    fn test_join_empty_name_rejected() {
        let mut room = room();
        let result = room.join(cid(1), "   ");
        assert!(matches!(result, Err(RoomError::JoinRejected(_))));
        assert!(room.players().is_empty());
    }

    #[test]
    fn test_join_twice_rejected() {
        let mut room = room();
        room.join(cid(1), "Alice").unwrap();
        assert!(matches!(
            room.join(cid(1), "Alice again"),
            Err(RoomError::AlreadyInRoom(..))
        ));
        assert!(matches!(
            room.join(HOST, "Host as player"),
            Err(RoomError::AlreadyInRoom(..))
        ));
    }

    #[test]
    fn test_late_joiner_receives_active_question() {
        let mut room = active_room(RevealPolicy::Manual);
        let (_, out) = room.join(cid(3), "Cara").unwrap();

        let to_cara = events_for(&out, &room, cid(3));
        assert!(to_cara.iter().any(|e| matches!(
            e,
            ServerEvent::NewQuestion { question_number: 1, .. }
        )));
    }

    #[test]
    fn test_leave_removes_player_and_keeps_room() {
        let mut room = room();
        room.join(cid(1), "Alice").unwrap();
        let out = room.leave(cid(1)).unwrap();

        assert!(room.players().is_empty());
        let to_host = events_for(&out, &room, HOST);
        assert!(matches!(
            to_host.as_slice(),
            [ServerEvent::PlayerLeft { player_count: 0, .. }]
        ));
    }

    #[test]
    fn test_leave_unknown_player_is_not_in_room() {
        let mut room = room();
        assert!(matches!(room.leave(cid(9)), Err(RoomError::NotInRoom(..))));
    }

    #[test]
    fn test_leave_keeps_submitted_answer_for_reveal() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(1), pick("A")).unwrap();
        room.leave(cid(1)).unwrap();

        let (result, _) = room.reveal_answers(HOST, None).unwrap();
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].player_name, "Alice");
    }

    // =====================================================================
    // broadcast_question
    // =====================================================================

    #[test]
    fn test_broadcast_by_non_host_forbidden() {
        let mut room = room();
        room.join(cid(1), "Alice").unwrap();
        let result = room.broadcast_question(cid(1), question());
        assert!(matches!(result, Err(RoomError::Forbidden(_))));
        assert_eq!(room.phase(), Phase::WaitingForPlayers);
    }

    #[test]
    fn test_broadcast_without_options_rejected() {
        let mut room = room();
        let empty = Question {
            text: "Nothing?".into(),
            options: vec![],
        };
        assert!(matches!(
            room.broadcast_question(HOST, empty),
            Err(RoomError::InvalidQuestion(_))
        ));
        assert_eq!(room.question_number(), 0);
    }

    #[test]
    fn test_broadcast_activates_and_targets_players() {
        let mut room = room();
        room.join(cid(1), "Alice").unwrap();
        let out = room.broadcast_question(HOST, question()).unwrap();

        assert_eq!(room.phase(), Phase::QuestionActive);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, Recipient::Players);
    }

    #[test]
    fn test_rebroadcast_discards_previous_answers() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(1), pick("A")).unwrap();

        room.broadcast_question(HOST, question()).unwrap();

        assert!(room.answers().is_empty());
        assert_eq!(room.question_number(), 2);
        assert_eq!(room.phase(), Phase::QuestionActive);
    }

    #[test]
    fn test_broadcast_after_reveal_starts_new_cycle() {
        let mut room = active_room(RevealPolicy::Manual);
        room.reveal_answers(HOST, None).unwrap();
        room.broadcast_question(HOST, question()).unwrap();
        assert_eq!(room.phase(), Phase::QuestionActive);
    }

    // =====================================================================
    // submit_answer
    // =====================================================================

    #[test]
    fn test_submit_before_question_is_invalid_phase() {
        let mut room = room();
        room.join(cid(1), "Alice").unwrap();
        assert!(matches!(
            room.submit_answer(cid(1), pick("A")),
            Err(RoomError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_submit_after_reveal_is_invalid_phase() {
        let mut room = active_room(RevealPolicy::Manual);
        room.reveal_answers(HOST, None).unwrap();
        assert!(matches!(
            room.submit_answer(cid(1), pick("A")),
            Err(RoomError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_submit_by_non_player_is_not_in_room() {
        let mut room = active_room(RevealPolicy::Manual);
        assert!(matches!(
            room.submit_answer(cid(42), pick("A")),
            Err(RoomError::NotInRoom(..))
        ));
        assert!(matches!(
            room.submit_answer(HOST, pick("A")),
            Err(RoomError::NotInRoom(..))
        ));
    }

    #[test]
    fn test_resubmission_overwrites() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(1), pick("A")).unwrap();
        let out = room.submit_answer(cid(1), pick("B")).unwrap();

        assert_eq!(room.answers().len(), 1);
        assert_eq!(room.answers()[&cid(1)].value, "B");
        assert!(out.iter().any(|(r, e)| *r == Recipient::Host
            && *e
                == ServerEvent::AnswerReceived {
                    answered_count: 1,
                    total_players: 2
                }));
    }

    #[test]
    fn test_submit_does_not_leak_to_other_players() {
        let mut room = active_room(RevealPolicy::Manual);
        let out = room.submit_answer(cid(1), pick("A")).unwrap();

        assert!(events_for(&out, &room, cid(2)).is_empty());
        let to_alice = events_for(&out, &room, cid(1));
        assert!(matches!(
            to_alice.as_slice(),
            [ServerEvent::AnswerConfirmed { question_number: 1, .. }]
        ));
    }

    #[test]
    fn test_manual_policy_waits_for_host_on_full_coverage() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(1), pick("A")).unwrap();
        room.submit_answer(cid(2), pick("B")).unwrap();
        assert_eq!(room.phase(), Phase::QuestionActive);
    }

    #[test]
    fn test_auto_policy_reveals_on_full_coverage() {
        let mut room = active_room(RevealPolicy::AutoOnFullCoverage);
        room.submit_answer(cid(1), pick("A")).unwrap();
        assert_eq!(room.phase(), Phase::QuestionActive);

        let out = room.submit_answer(cid(2), pick("B")).unwrap();
        assert_eq!(room.phase(), Phase::AnswersRevealed);
        let to_alice = events_for(&out, &room, cid(1));
        assert!(to_alice
            .iter()
            .any(|e| matches!(e, ServerEvent::AnswersRevealed { .. })));
    }

    #[test]
    fn test_auto_policy_reveals_when_last_unanswered_player_leaves() {
        let mut room = active_room(RevealPolicy::AutoOnFullCoverage);
        room.submit_answer(cid(1), pick("A")).unwrap();
        let out = room.leave(cid(2)).unwrap();

        assert_eq!(room.phase(), Phase::AnswersRevealed);
        let to_host = events_for(&out, &room, HOST);
        assert!(matches!(
            to_host.as_slice(),
            [
                ServerEvent::PlayerLeft { .. },
                ServerEvent::AnswerReceived { answered_count: 1, total_players: 1 },
                ServerEvent::AnswersRevealed { .. },
            ]
        ));
    }

    #[test]
    fn test_auto_policy_does_not_reveal_empty_room() {
        let mut room = active_room(RevealPolicy::AutoOnFullCoverage);
        room.leave(cid(1)).unwrap();
        room.leave(cid(2)).unwrap();
        assert_eq!(room.phase(), Phase::QuestionActive);
    }

    // =====================================================================
    // reveal_answers
    // =====================================================================

    #[test]
    fn test_reveal_by_non_host_forbidden() {
        let mut room = active_room(RevealPolicy::Manual);
        assert!(matches!(
            room.reveal_answers(cid(1), None),
            Err(RoomError::Forbidden(_))
        ));
        assert_eq!(room.phase(), Phase::QuestionActive);
    }

    #[test]
    fn test_reveal_before_any_question_is_invalid_phase() {
        let mut room = room();
        assert!(matches!(
            room.reveal_answers(HOST, None),
            Err(RoomError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_reveal_orders_by_join_not_submission() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(2), pick("B")).unwrap();
        room.submit_answer(cid(1), pick("A")).unwrap();

        let (result, out) = room.reveal_answers(HOST, None).unwrap();

        let names: Vec<_> =
            result.results.iter().map(|r| r.player_name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob"]);
        assert_eq!(room.phase(), Phase::AnswersRevealed);
        assert_eq!(out[0].0, Recipient::Everyone);
    }

    #[test]
    fn test_reveal_only_includes_submitters() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(2), pick("B")).unwrap();
        let (result, _) = room.reveal_answers(HOST, None).unwrap();
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].answer.value, "B");
    }

    #[test]
    fn test_reveal_twice_is_noop() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(1), pick("A")).unwrap();
        let (first, _) = room
            .reveal_answers(HOST, Some(&pick("A")))
            .unwrap();
        let (second, out) = room.reveal_answers(HOST, None).unwrap();

        assert_eq!(first, second);
        assert!(out.is_empty());
        assert_eq!(room.answers().len(), 1);
    }

    #[test]
    fn test_reveal_pairs_first_matching_player() {
        let mut room = active_room(RevealPolicy::Manual);
        room.join(cid(3), "Cara").unwrap();
        room.submit_answer(cid(3), pick("B")).unwrap();
        room.submit_answer(cid(1), pick("A")).unwrap();
        room.submit_answer(cid(2), pick("B")).unwrap();

        let (result, out) = room.reveal_answers(HOST, Some(&pick("B"))).unwrap();

        assert_eq!(result.matched, Some(cid(2)));
        let to_bob = events_for(&out, &room, cid(2));
        assert!(to_bob.iter().any(|e| matches!(
            e,
            ServerEvent::YourAnswerRevealed { player_name, .. } if player_name == "Bob"
        )));
        let to_cara = events_for(&out, &room, cid(3));
        assert!(!to_cara
            .iter()
            .any(|e| matches!(e, ServerEvent::YourAnswerRevealed { .. })));
    }

    #[test]
    fn test_reveal_pairing_skips_departed_players() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(1), pick("A")).unwrap();
        room.submit_answer(cid(2), pick("A")).unwrap();
        room.leave(cid(1)).unwrap();

        let (result, _) = room.reveal_answers(HOST, Some(&pick("A"))).unwrap();
        assert_eq!(result.matched, Some(cid(2)));
    }

    #[test]
    fn test_reveal_without_host_answer_has_no_match() {
        let mut room = active_room(RevealPolicy::Manual);
        room.submit_answer(cid(1), pick("A")).unwrap();
        let (result, out) = room.reveal_answers(HOST, None).unwrap();
        assert!(result.matched.is_none());
        assert_eq!(out.len(), 1);
    }

    // =====================================================================
    // recipients
    // =====================================================================

    #[test]
    fn test_recipients_resolve_against_roster() {
        let mut room = room();
        room.join(cid(1), "Alice").unwrap();
        room.join(cid(2), "Bob").unwrap();

        assert_eq!(room.recipients(Recipient::Host), vec![HOST]);
        assert_eq!(room.recipients(Recipient::Players), vec![cid(1), cid(2)]);
        assert_eq!(
            room.recipients(Recipient::Everyone),
            vec![HOST, cid(1), cid(2)]
        );
        assert_eq!(
            room.recipients(Recipient::EveryoneExcept(cid(1))),
            vec![HOST, cid(2)]
        );
    }
}
