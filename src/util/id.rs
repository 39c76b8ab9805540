//! ID utilities (ULIDs).

use ulid::Ulid;

/// Opaque identity of one attached connection. Display names may collide,
/// so rooms key membership on this instead.
pub type ParticipantId = Ulid;

/// Identity of one room *instance*. A room id string can be reused after
/// teardown; the instance id tells the old and new room apart.
pub type RoomInstance = Ulid;

pub fn new_participant_id() -> ParticipantId {
    Ulid::new()
}

pub fn new_room_instance() -> RoomInstance {
    Ulid::new()
}
