//! Configuration utilities (listen address, queue bounds, env vars)

use std::{env, net::{Ipv4Addr, SocketAddr}};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ROOM_QUEUE_CAPACITY: usize = 64;
const DEFAULT_OUTBOX_CAPACITY: usize = 32;

/// Socket address to bind the server to.
///
/// Reads the `PORT` env var or defaults to 8080, binds to 0.0.0.0.
pub fn server_addr() -> SocketAddr {
    let port = env_or("PORT", DEFAULT_PORT);
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Bound of each room's command queue (`ROOM_QUEUE_CAPACITY`).
pub fn room_queue_capacity() -> usize {
    positive(env_or("ROOM_QUEUE_CAPACITY", DEFAULT_ROOM_QUEUE_CAPACITY), DEFAULT_ROOM_QUEUE_CAPACITY)
}

/// Bound of each participant's outbound queue (`OUTBOX_CAPACITY`).
///
/// Messages for a participant whose queue is full are dropped rather than
/// stalling the room. That includes the one-time match result, which queues
/// behind any participant-list updates the client has not read yet. Every join
/// and leave before the draw adds one update, so keep this well above the
/// largest expected room.
pub fn outbox_capacity() -> usize {
    positive(env_or("OUTBOX_CAPACITY", DEFAULT_OUTBOX_CAPACITY), DEFAULT_OUTBOX_CAPACITY)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

// tokio mpsc panics on a zero bound
fn positive(value: usize, default: usize) -> usize {
    if value == 0 { default } else { value }
}
