//! Plain-data copies of the game state for host synchronization.
//!
//! The core stays serialization-free; the room protocol turns these into
//! wire messages.

use crate::core::game_state::GameState;
use crate::core::pieces::Piece;
use crate::types::{PieceKind, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub orientation: usize,
    pub rows: usize,
    pub cols: usize,
    pub color: u32,
    pub cells: Vec<u8>,
}

impl From<Piece> for PieceSnapshot {
    fn from(piece: Piece) -> Self {
        Self {
            kind: piece.kind(),
            orientation: piece.orientation(),
            rows: piece.rows(),
            cols: piece.cols(),
            color: piece.color(),
            cells: piece.mask().to_vec(),
        }
    }
}

/// Every field of the game state, detached from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<u32>,
    pub current_block: PieceSnapshot,
    pub current_position: Position,
    pub next_block: PieceSnapshot,
    pub cleared_lines: u32,
    pub level: u32,
    pub total_points: u32,
    pub game_over: bool,
}

impl GameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            rows: state.board().rows(),
            cols: state.board().cols(),
            cells: state.board().cells().to_vec(),
            current_block: state.current_block().into(),
            current_position: state.current_position(),
            next_block: state.next_block().into(),
            cleared_lines: state.cleared_lines(),
            level: state.level(),
            total_points: state.total_points(),
            game_over: state.game_over(),
        }
    }
}
