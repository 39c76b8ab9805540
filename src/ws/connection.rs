//! WebSocket connection lifecycle management.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::http::routes::AppState;
use crate::room::Participant;
use crate::ws::protocol::{ClientMessage, ServerMessage};

/// Raw query string of `/ws`. Everything is optional here so missing values
/// produce our own 400 instead of a generic extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    pub room: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub action: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Join,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub room: String,
    pub name: String,
    pub avatar: String,
    pub action: Action,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing name or room ID")]
    MissingNameOrRoom,
    #[error("action must be `create` or `join`")]
    InvalidAction,
}

impl IntoResponse for ValidationError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}

impl WsParams {
    pub fn validate(self) -> Result<ConnectRequest, ValidationError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        let (Some(room), Some(name)) = (present(self.room), present(self.name)) else {
            return Err(ValidationError::MissingNameOrRoom);
        };
        let action = match self.action.as_deref() {
            Some("create") => Action::Create,
            Some("join") => Action::Join,
            _ => return Err(ValidationError::InvalidAction),
        };
        Ok(ConnectRequest { room, name, avatar: self.avatar.unwrap_or_default(), action })
    }
}

pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let request = match params.validate() {
        Ok(request) => request,
        Err(error) => {
            tracing::debug!(%error, "rejecting connect");
            return error.into_response();
        }
    };
    ws.on_upgrade(move |socket| handle_socket(socket, state, request))
}

async fn handle_socket(socket: WebSocket, state: AppState, request: ConnectRequest) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (outbox, mut inbox) = mpsc::channel::<ServerMessage>(state.outbox_capacity);

    let participant = Participant::new(request.name, request.avatar, outbox);
    let participant_id = participant.id();
    let room_id = request.room;

    let attached = match request.action {
        Action::Create => state.rooms.create(&room_id, participant),
        Action::Join => state.rooms.join(&room_id, participant).await,
    };
    let room = match attached {
        Ok(room) => room,
        Err(error) => {
            tracing::info!(room = %room_id, %error, "connection refused");
            if let Err(error) = send_json(&mut ws_tx, &ServerMessage::Error(error.to_string())).await {
                tracing::debug!(room = %room_id, %error, "error message not sent");
            }
            let _ = ws_tx.close().await;
            return;
        }
    };

    // The room holds the only sender; once it drops this participant the
    // writer drains and closes the socket.
    let writer = tokio::spawn(async move {
        while let Some(msg) = inbox.recv().await {
            if send_json(&mut ws_tx, &msg).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::StartGame) => room.start(participant_id).await,
                Err(error) => {
                    tracing::debug!(room = %room_id, participant = %participant_id, %error, "ignoring client message");
                }
            },
            Message::Close(_) => break,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    room.leave(participant_id).await;
    let _ = writer.await;
    tracing::debug!(room = %room_id, participant = %participant_id, "ws closed");
}

async fn send_json(ws_tx: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> anyhow::Result<()> {
    let text = serde_json::to_string(msg)?;
    ws_tx.send(Message::Text(text)).await?;
    Ok(())
}
