//! Core module - pure game simulation with no I/O
//!
//! Board, piece catalogue, placement predicates, scoring, and the tick
//! pipeline. Nothing here is async and nothing here touches the network;
//! the room layer drives it with serialized events.

pub mod board;
pub mod game_state;
pub mod pieces;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod validation;

// Re-export commonly used types
pub use board::Board;
pub use game_state::{GameState, TickOutcome};
pub use pieces::{definition, random_piece, Piece, PieceDefinition};
pub use rng::SimpleRng;
pub use scoring::{drop_interval, level_for_cleared_lines, ScoreTable};
pub use snapshot::{GameSnapshot, PieceSnapshot};
pub use validation::{
    collides_with_board, is_bottom_out_of_bounds, is_left_out_of_bounds, is_right_out_of_bounds,
    keep_inside_bounds,
};
