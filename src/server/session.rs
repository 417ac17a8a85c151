//! # WebSocket Sessions
//!
//! One connection per player: inbound commands become world calls, and
//! every successful mutation fans a fresh snapshot out to all sessions.
//!
//! All shared state lives behind a single async mutex. Each inbound
//! command locks, mutates, snapshots, and unlocks; nothing await-s while
//! holding the lock except the lock acquisition itself, so commands from
//! different sessions serialize cleanly.

use crate::ai::AiBot;
use crate::config::{NAME_MAX_LEN, OBSERVER_BROADCAST_MS};
use crate::game::{GameWorld, PlayerId};
use crate::server::messages::{ClientMessage, ServerMessage, Snapshot};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Outbound half of one connected session.
pub struct ClientHandle {
    tx: UnboundedSender<Message>,
    observing: bool,
}

/// Everything the server mutates, behind one lock.
pub struct Shared {
    pub world: GameWorld,
    pub clients: HashMap<PlayerId, ClientHandle>,
    /// Bot player ids in spawn order; the first is the observer camera.
    pub bots: Vec<PlayerId>,
}

impl Shared {
    pub fn new(world: GameWorld) -> Self {
        Self {
            world,
            clients: HashMap::new(),
            bots: Vec::new(),
        }
    }
}

pub type AppState = Arc<Mutex<Shared>>;

/// Builds the HTTP router: the game socket plus a health probe.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/api/health", get(health))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let shared = state.lock().await;
    Json(json!({ "ok": true, "players": shared.world.online_count() }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

    let send_task: JoinHandle<()> = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let id: PlayerId = Uuid::new_v4();
    let mut joined = false;

    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else {
            continue;
        };
        let parsed: ClientMessage = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("session {id}: unparseable message: {err}");
                continue;
            }
        };
        handle_message(&state, id, &tx, &mut joined, parsed).await;
    }

    let mut shared = state.lock().await;
    shared.clients.remove(&id);
    if joined {
        shared.world.remove_player(id);
        push_all_states(&mut shared);
    }
    drop(shared);
    send_task.abort();
    log::info!("session {id} closed");
}

async fn handle_message(
    state: &AppState,
    id: PlayerId,
    tx: &UnboundedSender<Message>,
    joined: &mut bool,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::Join { name } => {
            if *joined {
                return;
            }
            let name = sanitize_name(name);
            let mut shared = state.lock().await;
            shared.world.add_player(id, name, false);
            shared.clients.insert(
                id,
                ClientHandle {
                    tx: tx.clone(),
                    observing: false,
                },
            );
            *joined = true;
            push_all_states(&mut shared);
        }
        ClientMessage::Move { dx, dy } => {
            if !*joined {
                return;
            }
            let mut shared = state.lock().await;
            if shared.clients.get(&id).is_some_and(|c| c.observing) {
                return;
            }
            let moved = shared.world.move_player(id, clamp_delta(dx), clamp_delta(dy));
            if moved {
                push_all_states(&mut shared);
            }
        }
        ClientMessage::Respawn => {
            if !*joined {
                return;
            }
            let mut shared = state.lock().await;
            shared.world.respawn_player(id);
            push_all_states(&mut shared);
        }
        ClientMessage::Observe { enabled } => {
            if !*joined {
                return;
            }
            let mut shared = state.lock().await;
            if let Some(client) = shared.clients.get_mut(&id) {
                client.observing = enabled;
            }
            push_state_to(&shared, id);
        }
    }
}

/// Trims, truncates, and defaults an offered player name.
fn sanitize_name(raw: Option<String>) -> String {
    let trimmed = raw
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("Adventurer_{}", rand::random::<u32>() % 1000));
    trimmed.chars().take(NAME_MAX_LEN).collect()
}

/// Movement deltas outside one tile are clamped, never rejected.
fn clamp_delta(d: i32) -> i32 {
    d.clamp(-1, 1)
}

/// Sends every joined, non-observing session its current snapshot.
/// Observer sessions refresh on their own fixed interval instead.
///
/// Delivery is fire-and-forget over each session's unbounded channel; a
/// dead channel is cleaned up when its socket task exits.
fn push_all_states(shared: &mut Shared) {
    let ids: Vec<PlayerId> = shared
        .clients
        .iter()
        .filter(|(_, c)| !c.observing)
        .map(|(id, _)| *id)
        .collect();
    for id in ids {
        push_state_to(shared, id);
    }
}

/// Sends one session its snapshot: its own view, or the observer view
/// through the primary bot's eyes.
fn push_state_to(shared: &Shared, id: PlayerId) {
    let Some(client) = shared.clients.get(&id) else {
        return;
    };
    let snapshot = if client.observing {
        match shared.bots.first() {
            Some(&primary) => Snapshot::for_observer(&shared.world, primary, &shared.bots),
            None => Snapshot::for_player(&shared.world, id),
        }
    } else {
        Snapshot::for_player(&shared.world, id)
    };
    let Some(snapshot) = snapshot else {
        return;
    };
    match serde_json::to_string(&ServerMessage::State { data: snapshot }) {
        Ok(text) => {
            let _ = client.tx.send(Message::Text(text.into()));
        }
        Err(err) => log::error!("failed to serialize snapshot for {id}: {err}"),
    }
}

/// Spawns one AI bot on its own turn timer.
///
/// The bot joins immediately; each tick locks the shared state, takes one
/// turn, and fans snapshots out so human sessions see bots move live.
pub fn spawn_bot(state: AppState, tick: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut bot = {
            let mut shared = state.lock().await;
            let bot = AiBot::spawn(&mut shared.world);
            shared.bots.push(bot.id);
            push_all_states(&mut shared);
            bot
        };

        let mut interval = tokio::time::interval(tick);
        loop {
            interval.tick().await;
            let mut shared = state.lock().await;
            bot.take_turn(&mut shared.world);
            push_all_states(&mut shared);
        }
    })
}

/// Spawns the fixed-rate refresh for observer sessions, so spectators see
/// bot movement even while no human acts.
pub fn spawn_observer_broadcast(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(OBSERVER_BROADCAST_MS));
        loop {
            interval.tick().await;
            let shared = state.lock().await;
            let observers: Vec<PlayerId> = shared
                .clients
                .iter()
                .filter(|(_, c)| c.observing)
                .map(|(id, _)| *id)
                .collect();
            for id in observers {
                push_state_to(&shared, id);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name_trims_and_truncates() {
        assert_eq!(sanitize_name(Some("  Hero  ".to_string())), "Hero");
        assert_eq!(
            sanitize_name(Some("A".repeat(40))),
            "A".repeat(NAME_MAX_LEN)
        );
    }

    #[test]
    fn test_sanitize_name_defaults_blank() {
        for raw in [None, Some(String::new()), Some("   ".to_string())] {
            let name = sanitize_name(raw);
            assert!(name.starts_with("Adventurer_"));
            let suffix: u32 = name["Adventurer_".len()..].parse().unwrap();
            assert!(suffix < 1000);
        }
    }

    #[test]
    fn test_clamp_delta() {
        assert_eq!(clamp_delta(5), 1);
        assert_eq!(clamp_delta(-7), -1);
        assert_eq!(clamp_delta(0), 0);
        assert_eq!(clamp_delta(1), 1);
    }

    #[tokio::test]
    async fn test_health_reports_player_count() {
        let state: AppState = Arc::new(Mutex::new(Shared::new(GameWorld::new(3))));
        {
            let mut shared = state.lock().await;
            shared
                .world
                .add_player(Uuid::new_v4(), "Hero".to_string(), false);
        }
        let Json(body) = health(State(state)).await;
        assert_eq!(body["ok"], true);
        assert_eq!(body["players"], 1);
    }
}
