//! Registry of active rooms.

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};

use super::actor::{self, RoomHandle};
use super::participant::Participant;
use super::state::Room;
use super::RoomError;
use crate::config;
use crate::util::id::{new_room_instance, RoomInstance};

/// Maps room id to the running room. Map locks are held for the map access
/// only; all per-room work happens on the room's own task.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<String, RoomHandle>>,
    queue_capacity: usize,
}

impl Default for RoomManager {
    fn default() -> Self { Self::new() }
}

impl RoomManager {
    pub fn new() -> Self {
        Self::with_queue_capacity(config::room_queue_capacity())
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self { rooms: Arc::new(DashMap::new()), queue_capacity: queue_capacity.max(1) }
    }

    /// Open a room with `creator` as its only participant and host.
    pub fn create(&self, id: &str, creator: Participant) -> Result<RoomHandle, RoomError> {
        match self.rooms.entry(id.to_owned()) {
            Entry::Occupied(_) => Err(RoomError::Conflict),
            Entry::Vacant(slot) => {
                let room = Room::new(id, creator);
                let handle = actor::spawn(room, new_room_instance(), self.clone(), self.queue_capacity);
                slot.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    pub fn lookup(&self, id: &str) -> Result<RoomHandle, RoomError> {
        self.rooms.get(id).map(|r| r.clone()).ok_or(RoomError::NotFound)
    }

    /// Look the room up and ask it to admit `participant`.
    pub async fn join(&self, id: &str, participant: Participant) -> Result<RoomHandle, RoomError> {
        let room = self.lookup(id)?;
        room.join(participant).await?;
        Ok(room)
    }

    /// Called by a room's event loop once it has emptied. Idempotent, and a
    /// newer room that reused the id is left alone.
    pub(crate) fn remove(&self, id: &str, instance: RoomInstance) {
        self.rooms.remove_if(id, |_, room| room.instance() == instance);
    }

    pub fn contains(&self, id: &str) -> bool { self.rooms.contains_key(id) }

    pub fn len(&self) -> usize { self.rooms.len() }

    pub fn is_empty(&self) -> bool { self.rooms.is_empty() }
}
