//! Room state machine: Lobby -> Started -> Closed.
//!
//! Pure and synchronous. The room's event loop owns the only instance and is
//! the only caller, which is what keeps these transitions race-free.

use rand::Rng;

use super::draw::{self, Pairing};
use super::participant::Participant;
use super::RoomError;
use crate::util::id::ParticipantId;
use crate::ws::protocol::RosterEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Started,
    Closed,
}

/// What a `leave` did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    NotMember,
    Left { host_changed: bool },
    /// The last participant left; the room is now closed.
    Emptied,
}

/// Why a start request was ignored. Never sent back to the requester.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRejected {
    #[error("room is closed")]
    Closed,
    #[error("draw already happened")]
    AlreadyStarted,
    #[error("only the host can start the draw")]
    NotHost,
    #[error("need at least two participants, have {0}")]
    NotEnoughParticipants(usize),
}

#[derive(Debug)]
pub struct Room {
    id: String,
    /// Join order. The longest-present participant is first.
    participants: Vec<Participant>,
    host: ParticipantId,
    started: bool,
    closed: bool,
}

impl Room {
    /// A new room in the lobby with `creator` as its only participant and host.
    pub fn new(id: impl Into<String>, creator: Participant) -> Self {
        Self {
            id: id.into(),
            host: creator.id(),
            participants: vec![creator],
            started: false,
            closed: false,
        }
    }

    pub fn id(&self) -> &str { &self.id }

    pub fn phase(&self) -> Phase {
        if self.closed {
            Phase::Closed
        } else if self.started {
            Phase::Started
        } else {
            Phase::Lobby
        }
    }

    pub fn is_started(&self) -> bool { self.started }

    pub fn host(&self) -> Option<ParticipantId> {
        (!self.participants.is_empty()).then_some(self.host)
    }

    pub fn participants(&self) -> &[Participant] { &self.participants }

    pub fn len(&self) -> usize { self.participants.len() }

    pub fn is_empty(&self) -> bool { self.participants.is_empty() }

    pub fn join(&mut self, participant: Participant) -> Result<(), RoomError> {
        match self.phase() {
            Phase::Closed => Err(RoomError::NotFound),
            Phase::Started => Err(RoomError::GameAlreadyStarted),
            Phase::Lobby => {
                self.participants.push(participant);
                Ok(())
            }
        }
    }

    /// Remove a participant. A departing host is replaced by whoever has been
    /// in the room longest.
    pub fn leave(&mut self, id: ParticipantId) -> Departure {
        let Some(index) = self.participants.iter().position(|p| p.id() == id) else {
            return Departure::NotMember;
        };
        self.participants.remove(index);

        if self.participants.is_empty() {
            self.closed = true;
            return Departure::Emptied;
        }
        if self.host == id {
            self.host = self.participants[0].id();
            return Departure::Left { host_changed: true };
        }
        Departure::Left { host_changed: false }
    }

    /// Run the draw if `requester` is the host of a lobby with at least two
    /// participants. On success the room is started and the returned pairings
    /// must be delivered privately, one per giver.
    pub fn start<R>(
        &mut self,
        requester: ParticipantId,
        rng: &mut R,
    ) -> Result<Vec<Pairing<'_, Participant>>, StartRejected>
    where
        R: Rng + ?Sized,
    {
        match self.phase() {
            Phase::Closed => return Err(StartRejected::Closed),
            Phase::Started => return Err(StartRejected::AlreadyStarted),
            Phase::Lobby => {}
        }
        if requester != self.host {
            return Err(StartRejected::NotHost);
        }
        let count = self.participants.len();
        if count < 2 {
            return Err(StartRejected::NotEnoughParticipants(count));
        }

        self.started = true;
        draw::draw_with(&self.participants, rng).ok_or(StartRejected::NotEnoughParticipants(count))
    }

    pub fn roster(&self) -> Vec<RosterEntry> {
        self.participants
            .iter()
            .map(|p| p.roster_entry(p.id() == self.host))
            .collect()
    }
}
