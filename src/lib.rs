//! Server-authoritative two-player Tetris room engine.
//!
//! `core` is the pure simulation (board, pieces, validation, tick pipeline);
//! `room` is the host layer that drives it with serialized gravity ticks and
//! client commands and broadcasts state after every mutation.

pub mod core;
pub mod room;
pub mod types;
