//! Protocol module - JSON wire messages between clients and the room
//!
//! Line-delimited JSON, one object per line in both directions. Ingress is
//! two commands: `{"type":"move","row":R,"col":C}` with one of the three
//! legal deltas, and `{"type":"rotate"}`. Egress is the full game state after
//! every mutation; invalid commands produce no reply at all.

use serde::{Deserialize, Serialize};

use crate::core::snapshot::{GameSnapshot, PieceSnapshot};
use crate::types::MOVE_OFFSETS;

/// Raw client message as it arrives off the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Move { row: i32, col: i32 },
    Rotate,
}

/// A validated command, ready for the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    Move { row: i32, col: i32 },
    Rotate,
}

impl ClientMessage {
    /// Validate the payload; move deltas outside the fixed set never reach
    /// the engine.
    pub fn into_command(self) -> Option<GameCommand> {
        match self {
            ClientMessage::Move { row, col } => {
                if MOVE_OFFSETS.contains(&(row, col)) {
                    Some(GameCommand::Move { row, col })
                } else {
                    None
                }
            }
            ClientMessage::Rotate => Some(GameCommand::Rotate),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardState {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieceState {
    pub kind: &'static str,
    pub orientation: usize,
    pub rows: usize,
    pub cols: usize,
    pub color: u32,
    pub cells: Vec<u8>,
}

impl From<&PieceSnapshot> for PieceState {
    fn from(snapshot: &PieceSnapshot) -> Self {
        Self {
            kind: snapshot.kind.as_str(),
            orientation: snapshot.orientation,
            rows: snapshot.rows,
            cols: snapshot.cols,
            color: snapshot.color,
            cells: snapshot.cells.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionState {
    pub row: i32,
    pub col: i32,
}

/// Full game state broadcast to every connected client
#[derive(Debug, Clone, Serialize)]
pub struct StateMessage {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub board: BoardState,
    pub current_block: PieceState,
    pub current_position: PositionState,
    pub next_block: PieceState,
    pub cleared_lines: u32,
    pub level: u32,
    pub total_points: u32,
    pub game_over: bool,
}

impl StateMessage {
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            message_type: "state",
            board: BoardState {
                rows: snapshot.rows,
                cols: snapshot.cols,
                cells: snapshot.cells.clone(),
            },
            current_block: (&snapshot.current_block).into(),
            current_position: PositionState {
                row: snapshot.current_position.row,
                col: snapshot.current_position.col,
            },
            next_block: (&snapshot.next_block).into(),
            cleared_lines: snapshot.cleared_lines,
            level: snapshot.level,
            total_points: snapshot.total_points,
            game_over: snapshot.game_over,
        }
    }
}

/// Sent to a client the room cannot admit, right before the socket closes
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub message: String,
}

impl ErrorMessage {
    pub fn room_full() -> Self {
        Self {
            message_type: "error",
            message: "room is full".to_string(),
        }
    }
}
