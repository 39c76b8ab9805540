//! Room server for gift-exchange draws.
//!
//! Participants create or join a named room over a WebSocket; the host
//! triggers a one-time draw and every participant privately learns whom they
//! give to.

pub mod config;
pub mod http;
pub mod room;
pub mod telemetry;
pub mod util;
pub mod ws;

pub use http::routes::{router, AppState};
