//! Per-room event loop.
//!
//! Every membership change, draw and broadcast for one room goes through a
//! single task reading a bounded command queue, so they are totally ordered
//! and the room state needs no lock.

use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::draw::Pairing;
use super::manager::RoomManager;
use super::participant::Participant;
use super::state::{Departure, Room};
use super::RoomError;
use crate::util::id::{ParticipantId, RoomInstance};
use crate::ws::protocol::{RosterEntry, ServerMessage};

#[derive(Debug)]
enum Command {
    Join {
        participant: Participant,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Leave {
        id: ParticipantId,
        done: oneshot::Sender<()>,
    },
    Start {
        requester: ParticipantId,
    },
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// Read-only view of a room at one point in its command order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub id: String,
    pub roster: Vec<RosterEntry>,
    pub members: Vec<ParticipantId>,
    pub host: Option<ParticipantId>,
    pub started: bool,
}

/// Cheap, cloneable address of a running room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    id: String,
    instance: RoomInstance,
    tx: mpsc::Sender<Command>,
}

impl RoomHandle {
    pub fn id(&self) -> &str { &self.id }

    pub fn instance(&self) -> RoomInstance { self.instance }

    /// Ask the room to admit `participant`. A room that closed while the
    /// request was in flight answers `NotFound`.
    pub async fn join(&self, participant: Participant) -> Result<(), RoomError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Join { participant, reply })
            .await
            .map_err(|_| RoomError::NotFound)?;
        rx.await.unwrap_or(Err(RoomError::NotFound))
    }

    /// Remove a participant and wait until the room has processed it. Once
    /// this returns for the last participant the room id is free again.
    pub async fn leave(&self, id: ParticipantId) {
        let (done, rx) = oneshot::channel();
        if self.tx.send(Command::Leave { id, done }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Request the draw. Ignored unless `requester` is the host of a lobby
    /// with at least two participants; the requester is never told either way.
    pub async fn start(&self, requester: ParticipantId) {
        if self.tx.send(Command::Start { requester }).await.is_err() {
            debug!(room = %self.id, participant = %requester, "start for closed room");
        }
    }

    /// `None` once the room has closed.
    pub async fn snapshot(&self) -> Option<RoomSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.tx.send(Command::Snapshot { reply }).await.ok()?;
        rx.await.ok()
    }
}

struct RoomActor {
    id: String,
    instance: RoomInstance,
    room: Room,
    registry: RoomManager,
    rx: mpsc::Receiver<Command>,
}

/// Spawn the event loop for a freshly created room. The creator receives the
/// first participant list before any queued command is handled.
pub(crate) fn spawn(
    room: Room,
    instance: RoomInstance,
    registry: RoomManager,
    queue_capacity: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(queue_capacity);
    let id = room.id().to_owned();
    let actor = RoomActor { id: id.clone(), instance, room, registry, rx };
    tokio::spawn(actor.run());
    RoomHandle { id, instance, tx }
}

impl RoomActor {
    async fn run(mut self) {
        info!(room = %self.id, "room opened");
        self.broadcast_roster();

        while let Some(command) = self.rx.recv().await {
            match command {
                Command::Join { participant, reply } => {
                    let participant_id = participant.id();
                    let result = self.room.join(participant);
                    let _ = reply.send(result);
                    match result {
                        Ok(()) => {
                            info!(room = %self.id, participant = %participant_id, size = self.room.len(), "participant joined");
                            self.broadcast_roster();
                        }
                        Err(error) => {
                            debug!(room = %self.id, participant = %participant_id, %error, "join refused");
                        }
                    }
                }
                Command::Leave { id, done } => {
                    let closed = self.leave(id);
                    let _ = done.send(());
                    if closed {
                        break;
                    }
                }
                Command::Start { requester } => self.start(requester),
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
            }
        }
        // dropping `rx` here discards anything still queued; pending joiners see NotFound
    }

    /// Returns true once the room has emptied and left the registry.
    fn leave(&mut self, id: ParticipantId) -> bool {
        match self.room.leave(id) {
            Departure::NotMember => false,
            Departure::Left { host_changed } => {
                info!(room = %self.id, participant = %id, host_changed, size = self.room.len(), "participant left");
                self.broadcast_roster();
                false
            }
            Departure::Emptied => {
                self.registry.remove(&self.id, self.instance);
                info!(room = %self.id, "room closed");
                true
            }
        }
    }

    fn start(&mut self, requester: ParticipantId) {
        // fresh seed for every draw
        let mut rng = StdRng::from_entropy();
        match self.room.start(requester, &mut rng) {
            Ok(pairings) => {
                let count = pairings.len();
                deliver_matches(&self.id, &pairings);
                info!(room = %self.id, pairings = count, "draw complete");
            }
            Err(reason) => {
                debug!(room = %self.id, participant = %requester, %reason, "start ignored");
            }
        }
    }

    fn broadcast_roster(&self) {
        let msg = ServerMessage::ParticipantListUpdate(self.room.roster());
        for participant in self.room.participants() {
            if let Err(error) = participant.deliver(msg.clone()) {
                warn!(room = %self.id, participant = %participant.id(), %error, "participant list not delivered");
            }
        }
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            roster: self.room.roster(),
            members: self.room.participants().iter().map(Participant::id).collect(),
            host: self.room.host(),
            started: self.room.is_started(),
        }
    }
}

/// Send each giver the name of their receiver, and nothing else to anyone.
/// The names are not logged. A giver whose outbox is full or closed misses
/// their result; the others still get theirs.
fn deliver_matches(room: &str, pairings: &[Pairing<'_, Participant>]) {
    for Pairing { giver, receiver } in pairings {
        if let Err(error) = giver.deliver(ServerMessage::MatchResult(receiver.name().to_owned())) {
            warn!(%room, participant = %giver.id(), %error, "match result not delivered");
        }
    }
}
