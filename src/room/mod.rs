//! Room module - host-side plumbing around the simulation core
//!
//! Protocol types, the gravity scheduler, the room event loop, and the TCP
//! server that feeds it.

pub mod protocol;
pub mod room;
pub mod scheduler;
pub mod server;

pub use protocol::{ClientMessage, GameCommand, StateMessage};
pub use room::{GameRoom, RoomEvent, RoomHandle, RoomOptions, MAX_CLIENTS};
pub use scheduler::GravityScheduler;
pub use server::{run_server, ServerConfig};
