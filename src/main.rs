//! Delved server binary.
//!
//! Binds the WebSocket endpoint, spawns the configured AI bots on their
//! turn timers, and serves until interrupted.

use clap::Parser;
use delved::server::{router, spawn_bot, spawn_observer_broadcast, AppState, Shared};
use delved::{DelveResult, GameWorld, VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "delved", version = VERSION, about = "Multiplayer roguelike dungeon server")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Number of AI bots to spawn
    #[arg(long, default_value_t = 4)]
    bots: usize,

    /// Milliseconds between AI bot turns
    #[arg(long, default_value_t = delved::config::AI_TICK_MS)]
    bot_tick_ms: u64,

    /// World generation seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> DelveResult<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_level.as_str()))
        .init();

    let world = match args.seed {
        Some(seed) => GameWorld::new(seed),
        None => GameWorld::default(),
    };
    let state: AppState = Arc::new(Mutex::new(Shared::new(world)));

    // Detached tasks: bots and the observer refresh run for the process
    // lifetime.
    for _ in 0..args.bots {
        let _ = spawn_bot(state.clone(), Duration::from_millis(args.bot_tick_ms));
    }
    let _ = spawn_observer_broadcast(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    log::info!("delved v{VERSION} listening on {addr} with {} bots", args.bots);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
