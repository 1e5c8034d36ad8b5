//! Game room - the host-side event loop around one simulation
//!
//! The room exclusively owns its `GameState`. Gravity ticks, player commands,
//! and join/leave all arrive on a single mpsc queue and are applied one at a
//! time, in arrival order; that serialization is the whole concurrency story.
//! After every mutation the full state goes out to both players.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::core::GameState;
use crate::room::protocol::{ErrorMessage, GameCommand, StateMessage};
use crate::room::scheduler::GravityScheduler;
use crate::types::{DEFAULT_COLS, DEFAULT_LEVEL, DEFAULT_ROWS};

/// A room serves one shared board to at most two players
pub const MAX_CLIENTS: usize = 2;

/// Everything the room reacts to
#[derive(Debug)]
pub enum RoomEvent {
    /// Gravity step, stamped with the schedule generation that produced it
    Tick { generation: u64 },
    /// Validated player command
    Command {
        client_id: usize,
        command: GameCommand,
    },
    /// New client; `accepted` answers whether the room admitted it
    Join {
        client_id: usize,
        tx: mpsc::UnboundedSender<String>,
        accepted: oneshot::Sender<bool>,
    },
    Leave { client_id: usize },
}

#[derive(Debug, Clone)]
pub struct RoomOptions {
    pub rows: usize,
    pub cols: usize,
    pub initial_level: u32,
    pub seed: u32,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            initial_level: DEFAULT_LEVEL,
            seed: 1,
        }
    }
}

/// Handle returned by [`GameRoom::spawn`]: the event queue plus the running
/// loop task
pub struct RoomHandle {
    pub events: mpsc::Sender<RoomEvent>,
    pub task: tokio::task::JoinHandle<()>,
}

struct RoomClient {
    id: usize,
    tx: mpsc::UnboundedSender<String>,
}

pub struct GameRoom {
    state: GameState,
    scheduler: GravityScheduler,
    clients: Vec<RoomClient>,
}

impl GameRoom {
    /// Create the room and start its event loop task. Gravity begins
    /// immediately at the initial level's period.
    pub fn spawn(options: RoomOptions) -> RoomHandle {
        let (events_tx, events_rx) = mpsc::channel(64);
        let room = GameRoom {
            state: GameState::new(
                options.rows,
                options.cols,
                options.initial_level,
                options.seed,
            ),
            scheduler: GravityScheduler::new(events_tx.clone()),
            clients: Vec::new(),
        };

        info!(
            rows = options.rows,
            cols = options.cols,
            level = options.initial_level,
            seed = options.seed,
            "room created"
        );

        let task = tokio::spawn(room.run(events_rx));
        RoomHandle {
            events: events_tx,
            task,
        }
    }

    async fn run(mut self, mut events: mpsc::Receiver<RoomEvent>) {
        self.scheduler.start(self.state.drop_interval());

        while let Some(event) = events.recv().await {
            match event {
                RoomEvent::Tick { generation } => {
                    if !self.scheduler.accepts(generation) {
                        // Stale tick from a schedule replaced by a level-up
                        // (or stopped by game over)
                        continue;
                    }
                    self.on_tick();
                }
                RoomEvent::Command { client_id, command } => {
                    self.on_command(client_id, command);
                }
                RoomEvent::Join {
                    client_id,
                    tx,
                    accepted,
                } => {
                    let admitted = self.on_join(client_id, tx);
                    let _ = accepted.send(admitted);
                }
                RoomEvent::Leave { client_id } => self.on_leave(client_id),
            }
        }
    }

    fn on_tick(&mut self) {
        let outcome = self.state.tick();

        if outcome.game_over {
            self.scheduler.stop();
            info!(
                total_points = self.state.total_points(),
                cleared_lines = self.state.cleared_lines(),
                "game over, gravity stopped"
            );
        } else if outcome.level_changed {
            let period = self.state.drop_interval();
            info!(level = self.state.level(), ?period, "level up, gravity rescheduled");
            self.scheduler.restart(period);
        }

        if outcome.lines_cleared > 0 {
            debug!(
                lines = outcome.lines_cleared,
                total_points = self.state.total_points(),
                "lines cleared"
            );
        }

        self.broadcast_state();
    }

    fn on_command(&mut self, client_id: usize, command: GameCommand) {
        let applied = match command {
            GameCommand::Move { row, col } => self.state.try_move(row, col),
            GameCommand::Rotate => self.state.try_rotate(),
        };

        if applied {
            self.broadcast_state();
        } else {
            // Silent rejection: no state change, nothing sent back
            debug!(client_id, ?command, "command rejected");
        }
    }

    fn on_join(&mut self, client_id: usize, tx: mpsc::UnboundedSender<String>) -> bool {
        if self.clients.len() >= MAX_CLIENTS {
            let _ = tx.send(full_room_line());
            info!(client_id, "join refused, room full");
            return false;
        }

        // New clients get the current state right away
        if let Some(line) = self.state_line() {
            let _ = tx.send(line);
        }
        self.clients.push(RoomClient { id: client_id, tx });
        info!(client_id, players = self.clients.len(), "client joined");
        true
    }

    fn on_leave(&mut self, client_id: usize) {
        self.clients.retain(|client| client.id != client_id);
        info!(client_id, players = self.clients.len(), "client left");
    }

    fn state_line(&self) -> Option<String> {
        let message = StateMessage::from_snapshot(&self.state.snapshot());
        match serde_json::to_string(&message) {
            Ok(line) => Some(line),
            Err(error) => {
                warn!(%error, "state serialization failed");
                None
            }
        }
    }

    fn broadcast_state(&mut self) {
        let Some(line) = self.state_line() else {
            return;
        };
        // Drop clients whose writer has gone away
        self.clients.retain(|client| client.tx.send(line.clone()).is_ok());
    }
}

fn full_room_line() -> String {
    serde_json::to_string(&ErrorMessage::room_full())
        .unwrap_or_else(|_| String::from(r#"{"type":"error","message":"room is full"}"#))
}
