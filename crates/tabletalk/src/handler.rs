//! Per-connection handler: registration, event routing, and delivery.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound channel with the registry → send `connected`
//!   2. Loop: decode inbound envelopes and dispatch them to the registry,
//!      while forwarding queued room events to the socket
//!   3. On exit (close, error, or an idle connection outside any room)
//!      the guard disconnects the client from whatever room it was in

use std::sync::Arc;
use std::time::Duration;

use tabletalk_protocol::{
    ClientEvent, ClientId, Codec, Envelope, ErrorReason, PROTOCOL_VERSION,
    ServerEvent,
};
use tabletalk_room::{ClientSender, RoomError};
use tabletalk_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::TableTalkError;
use crate::server::ServerState;

/// Drop guard that removes a client from the registry when the handler
/// exits, including on panic. `Drop` is synchronous, so the async lock is
/// taken in a fire-and-forget task.
struct ConnectionGuard {
    client: ClientId,
    state: Arc<ServerState>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let client = self.client;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.registry.lock().await.disconnect(client);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    state: Arc<ServerState>,
) -> Result<(), TableTalkError> {
    let client = ClientId::from(conn.id());
    tracing::debug!(%client, "handling new connection");

    // Everything bound for this socket goes through one queue, so direct
    // replies and room fan-out keep their relative order.
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.registry.lock().await.connect(client, tx.clone());
    let _guard = ConnectionGuard {
        client,
        state: Arc::clone(&state),
    };

    let _ = tx.send(ServerEvent::Connected {
        client_id: client,
        protocol_version: PROTOCOL_VERSION,
    });

    let idle_timeout = state.config.idle_timeout;
    let idle = tokio::time::sleep(idle_timeout.unwrap_or(Duration::MAX));
    tokio::pin!(idle);
    let mut seq: u64 = 1;

    loop {
        tokio::select! {
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%client, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%client, error = %e, "recv error");
                        break;
                    }
                };
                handle_frame(&state, client, &tx, &data).await;
            }

            Some(event) = rx.recv() => {
                send_event(&conn, &state, &mut seq, event).await?;
            }

            () = &mut idle, if idle_timeout.is_some() => {
                let timeout = idle_timeout.unwrap_or(Duration::MAX);
                let quiet = conn.idle_for();
                if quiet < timeout {
                    idle.as_mut().reset(Instant::now() + (timeout - quiet));
                    continue;
                }
                // Hosts and players wait as long as the game needs.
                if state.registry.lock().await.membership(client).is_some() {
                    idle.as_mut().reset(Instant::now() + timeout);
                    continue;
                }
                tracing::info!(%client, "idle connection closed");
                let _ = conn.close().await;
                break;
            }
        }
    }

    // _guard drops here → registry disconnect fires.
    Ok(())
}

/// Decodes one inbound frame and dispatches it. Failures are reported to
/// the client; none of them end the connection.
async fn handle_frame(
    state: &ServerState,
    client: ClientId,
    reply: &ClientSender,
    data: &[u8],
) {
    let envelope: Envelope<ClientEvent> = match state.codec.decode(data) {
        Ok(env) => env,
        Err(e) => {
            tracing::debug!(%client, error = %e, "failed to decode envelope");
            let _ = reply.send(ServerEvent::Error {
                reason: ErrorReason::BadRequest,
                message: e.to_string(),
            });
            return;
        }
    };

    if let Some(event) = dispatch(state, client, envelope.event).await {
        let _ = reply.send(event);
    }
}

/// Routes a client event to the registry. Returns a direct reply for the
/// sender, if any; room events are delivered by the registry itself.
async fn dispatch(
    state: &ServerState,
    client: ClientId,
    event: ClientEvent,
) -> Option<ServerEvent> {
    let result = match event {
        ClientEvent::Heartbeat { client_time } => {
            return Some(ServerEvent::HeartbeatAck {
                client_time,
                server_time: state.elapsed_ms(),
            });
        }
        ClientEvent::JoinRoom {
            room_code,
            player_name,
        } => {
            let joined = state.registry.lock().await.join_room(
                client,
                &room_code,
                &player_name,
            );
            // Joins report failure with their own event.
            return joined.err().map(|e| {
                tracing::debug!(%client, room = %room_code, error = %e, "join failed");
                ServerEvent::JoinError {
                    message: e.to_string(),
                }
            });
        }
        ClientEvent::CreateRoom { host_name } => state
            .registry
            .lock()
            .await
            .create_room(client, &host_name)
            .map(drop),
        ClientEvent::LeaveRoom { room_code } => {
            state.registry.lock().await.leave_room(client, &room_code)
        }
        ClientEvent::BroadcastQuestion {
            room_code,
            question,
        } => state
            .registry
            .lock()
            .await
            .broadcast_question(client, &room_code, question),
        ClientEvent::SubmitAnswer { room_code, answer } => state
            .registry
            .lock()
            .await
            .submit_answer(client, &room_code, answer),
        ClientEvent::RevealAnswers {
            room_code,
            host_answer,
        } => state
            .registry
            .lock()
            .await
            .reveal_answers(client, &room_code, host_answer.as_ref())
            .map(drop),
    };

    result.err().map(|e| error_event(client, &e))
}

fn error_event(client: ClientId, err: &RoomError) -> ServerEvent {
    tracing::debug!(%client, error = %err, "operation rejected");
    ServerEvent::Error {
        reason: err.reason(),
        message: err.to_string(),
    }
}

/// Wraps an event in an envelope and writes it to the socket.
async fn send_event(
    conn: &WebSocketConnection,
    state: &ServerState,
    seq: &mut u64,
    event: ServerEvent,
) -> Result<(), TableTalkError> {
    let envelope = Envelope::new(next_seq(seq), state.elapsed_ms(), event);
    let bytes = state.codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}
