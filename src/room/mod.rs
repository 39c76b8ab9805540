//! Rooms: the state machine, its per-room event loop, the registry, and the draw.

pub mod actor;
pub mod draw;
pub mod manager;
pub mod participant;
pub mod state;

pub use actor::{RoomHandle, RoomSnapshot};
pub use manager::RoomManager;
pub use participant::{DeliveryError, Outbox, Participant};
pub use state::{Departure, Phase, Room, StartRejected};

/// Failures reported to a connecting client as an `error` message before its
/// socket is closed. The display text is what the client sees.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room already exists")]
    Conflict,
    #[error("Room does not exist")]
    NotFound,
    #[error("Game already started")]
    GameAlreadyStarted,
}
