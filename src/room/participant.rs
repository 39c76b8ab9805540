//! A connected participant as the room sees it.

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::util::id::{new_participant_id, ParticipantId};
use crate::ws::protocol::{RosterEntry, ServerMessage};

/// Send side of a connection's outbound queue. The connection's writer task
/// owns the receiver and forwards to the socket.
pub type Outbox = mpsc::Sender<ServerMessage>;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("outbox full")]
    Full,
    #[error("connection closed")]
    Closed,
}

#[derive(Debug, Clone)]
pub struct Participant {
    id: ParticipantId,
    name: String,
    avatar: String,
    outbox: Outbox,
}

impl Participant {
    pub fn new(name: impl Into<String>, avatar: impl Into<String>, outbox: Outbox) -> Self {
        Self {
            id: new_participant_id(),
            name: name.into(),
            avatar: avatar.into(),
            outbox,
        }
    }

    pub fn id(&self) -> ParticipantId { self.id }

    pub fn name(&self) -> &str { &self.name }

    /// Queue a message without waiting. Never blocks the room loop.
    pub fn deliver(&self, msg: ServerMessage) -> Result<(), DeliveryError> {
        self.outbox.try_send(msg).map_err(|err| match err {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    pub(crate) fn roster_entry(&self, is_host: bool) -> RosterEntry {
        RosterEntry {
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            is_host,
        }
    }
}
