use crate::server::AppState;
use crate::stream::{Frame, Inbound, SubscribeRequest};
use axum::{
    Json,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt, future};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;

impl From<Frame> for Message {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Text(text) => Message::Text(text.into()),
            Frame::Close => Message::Close(None),
        }
    }
}

fn inbound(message: Result<Message, axum::Error>) -> Inbound {
    match message {
        Ok(Message::Close(_)) | Err(_) => Inbound::Close,
        Ok(_) => Inbound::Message,
    }
}

/// Fallback route: every WebSocket handshake lands here and the request path
/// picks the topic. Plain HTTP requests get the usual 404.
pub async fn subscribe(
    State(state): State<AppState>,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            debug!("{} is not a websocket request: {rejection}", uri.path());
            return (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response();
        }
    };

    let request = SubscribeRequest {
        path: uri.path().to_string(),
        params,
    };

    upgrade.on_upgrade(move |socket| handle_socket(socket, state, request))
}

async fn handle_socket(socket: WebSocket, state: AppState, request: SubscribeRequest) {
    let (sender, receiver) = socket.split();
    let tx = sender.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(Message::from(frame))));
    let rx = receiver.map(inbound);

    state.publisher().serve(request, tx, rx).await;
}
