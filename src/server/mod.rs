//! # Server Module
//!
//! The network edge: the JSON wire protocol, per-connection WebSocket
//! sessions, AI bot turn timers, and the observer broadcast.
//!
//! The world itself never learns about sockets. Sessions translate
//! commands into world calls under one lock and push complete snapshots
//! back out, so the game layer stays testable without any transport.

pub mod messages;
pub mod session;

pub use messages::{ClientMessage, ServerMessage, Snapshot};
pub use session::{router, spawn_bot, spawn_observer_broadcast, AppState, Shared};
