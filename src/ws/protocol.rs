//! Wire messages exchanged over the room socket.

use serde::{Deserialize, Serialize};

/// Server → client envelope: `{"type": ..., "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Full roster of the room, sent to everyone on every membership or host change.
    ParticipantListUpdate(Vec<RosterEntry>),
    /// The display name the receiving participant draws. Sent to one giver only.
    MatchResult(String),
    Error(String),
}

/// Client → server messages. Anything else on the socket is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    StartGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub name: String,
    pub avatar: String,
    pub is_host: bool,
}
