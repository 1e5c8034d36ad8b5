//! TCP host for a game room
//!
//! Line-delimited JSON over TCP: each accepted client gets a reader task that
//! parses commands into room events and a writer task that drains the room's
//! broadcast channel. The room itself never touches a socket.

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::room::protocol::{ClientMessage, ErrorMessage};
use crate::room::room::{GameRoom, RoomEvent, RoomOptions};
use crate::types::{DEFAULT_COLS, DEFAULT_LEVEL, DEFAULT_ROWS};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub room: RoomOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7000,
            room: RoomOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Build the configuration from environment variables:
    /// `TETRIS_ROOM_HOST`, `TETRIS_ROOM_PORT`, `TETRIS_ROOM_ROWS`,
    /// `TETRIS_ROOM_COLS`, `TETRIS_ROOM_LEVEL`, `TETRIS_ROOM_SEED`.
    /// An unset seed derives from the clock.
    pub fn from_env() -> Self {
        use std::env;

        let host = env::var("TETRIS_ROOM_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("TETRIS_ROOM_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(7000);
        let rows = env::var("TETRIS_ROOM_ROWS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&rows| rows > 0)
            .unwrap_or(DEFAULT_ROWS);
        let cols = env::var("TETRIS_ROOM_COLS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&cols| cols > 0)
            .unwrap_or(DEFAULT_COLS);
        let initial_level = env::var("TETRIS_ROOM_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_LEVEL);
        let seed = env::var("TETRIS_ROOM_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(clock_seed);

        Self {
            host,
            port,
            room: RoomOptions {
                rows,
                cols,
                initial_level,
                seed,
            },
        }
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos().wrapping_add(elapsed.as_secs() as u32))
        .unwrap_or(1)
}

/// Bind, spawn the room, and serve clients until the process stops.
///
/// `ready_tx` reports the bound address once the listener is up (tests bind
/// port 0 and need the real port back).
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr().context("no local address")?;

    info!(%bound, "room server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let handle = GameRoom::spawn(config.room.clone());
    let mut client_id_counter = 0usize;

    loop {
        let (socket, addr) = listener.accept().await.context("accept failed")?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        let events = handle.events.clone();

        tokio::spawn(async move {
            if let Err(error) = handle_client(socket, addr, client_id, events).await {
                debug!(client_id, %error, "client connection ended with error");
            }
        });
    }
}

async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    events: mpsc::Sender<RoomEvent>,
) -> Result<()> {
    socket.set_nodelay(true).ok();
    info!(client_id, %addr, "client connected");

    let (reader, mut writer) = tokio::io::split(socket);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let (accepted_tx, accepted_rx) = oneshot::channel();
    events
        .send(RoomEvent::Join {
            client_id,
            tx,
            accepted: accepted_tx,
        })
        .await
        .context("room is gone")?;

    if !accepted_rx.await.unwrap_or(false) {
        // The room queued its refusal on our channel; flush it and hang up
        if let Some(line) = rx.recv().await {
            let _ = writer.write_all(line.as_bytes()).await;
            let _ = writer.write_all(b"\n").await;
        } else {
            let line = serde_json::to_string(&ErrorMessage::room_full())?;
            let _ = writer.write_all(line.as_bytes()).await;
            let _ = writer.write_all(b"\n").await;
        }
        return Ok(());
    }

    // Writer: drain room broadcasts onto the socket
    let write_task = tokio::spawn(async move {
        while let Some(line) = rx.recv().await {
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.write_all(b"\n").await.is_err() {
                break;
            }
        }
    });

    // Reader: one command per line
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<ClientMessage>(line) {
            Ok(message) => match message.into_command() {
                Some(command) => {
                    if events
                        .send(RoomEvent::Command { client_id, command })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                None => debug!(client_id, line, "illegal move delta dropped"),
            },
            Err(error) => {
                warn!(client_id, %error, "malformed client line");
            }
        }
    }

    info!(client_id, "client disconnected");
    let _ = events.send(RoomEvent::Leave { client_id }).await;
    write_task.abort();
    Ok(())
}
