//! WebSocket endpoint: JSON-RPC tool dispatch over one message channel.
//!
//! Each request frame runs as its own task so multiple requests — including
//! multiple from the same access key — can be in flight concurrently on one
//! connection. Closing the socket aborts outstanding tasks, which cancels
//! in-flight provider calls; the quota reservation they already made stays
//! consumed.

use crate::mapper;
use crate::rpc::{self, RpcError, RpcRequest, RpcResponse};
use crate::AppState;
use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Extension, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use voxway_pipeline::prompts;
use voxway_quota::AccessError;

/// Per-connection buffer of pending outgoing frames. Beyond this the
/// connection is too slow and the send blocks until it drains.
const OUTGOING_BUFFER: usize = 64;

/// `GET /ws` — upgrades to the JSON-RPC channel.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    // Audio arrives base64-encoded inside a frame; the ceiling leaves
    // headroom over the 10 MiB decoded payload limit.
    ws.max_message_size(16 * 1024 * 1024)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(OUTGOING_BUFFER);

    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(WsMessage::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    let mut in_flight = JoinSet::new();

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            WsMessage::Text(text) => {
                let request = match serde_json::from_str::<RpcRequest>(&text.to_string()) {
                    Ok(request) => request,
                    Err(e) => {
                        send_response(
                            &tx,
                            RpcResponse::fail(
                                None,
                                RpcError::new(rpc::PARSE_ERROR, format!("invalid JSON-RPC frame: {e}")),
                            ),
                        )
                        .await;
                        continue;
                    }
                };

                if request.jsonrpc != "2.0" {
                    send_response(
                        &tx,
                        RpcResponse::fail(
                            request.id,
                            RpcError::new(rpc::INVALID_REQUEST, "jsonrpc must be \"2.0\""),
                        ),
                    )
                    .await;
                    continue;
                }

                let state = state.clone();
                let tx = tx.clone();
                in_flight.spawn(async move {
                    let response = dispatch(&state, request).await;
                    send_response(&tx, response).await;
                });
            }
            WsMessage::Close(_) => break,
            // Ping/pong are handled by axum; binary frames are not part of
            // the protocol.
            _ => {}
        }
    }

    // Connection gone: abort outstanding pipeline runs so their provider
    // calls are cancelled. Reservations already made are not refunded.
    in_flight.abort_all();
    send_task.abort();
}

async fn send_response(tx: &mpsc::Sender<String>, response: RpcResponse) {
    match serde_json::to_string(&response) {
        Ok(frame) => {
            if tx.send(frame).await.is_err() {
                tracing::debug!("connection closed before response could be sent");
            }
        }
        Err(e) => {
            tracing::error!("failed to serialize JSON-RPC response: {e}");
        }
    }
}

/// Routes one request frame to its tool.
async fn dispatch(state: &AppState, request: RpcRequest) -> RpcResponse {
    let id = request.id.clone();
    match request.method.as_str() {
        "process_voice" => {
            let params: mapper::ProcessVoiceParams = match serde_json::from_value(request.params) {
                Ok(p) => p,
                Err(e) => {
                    return RpcResponse::fail(id, RpcError::new(rpc::INVALID_PARAMS, e.to_string()))
                }
            };
            match state.orchestrator.process(mapper::to_raw_request(params)).await {
                Ok(result) => RpcResponse::ok(id, mapper::to_reply(&result)),
                Err(e) => {
                    tracing::info!(error = %e, "process_voice run failed");
                    RpcResponse::fail(id, mapper::error_to_rpc(&e))
                }
            }
        }
        "get_available_providers" => match serde_json::to_value(state.registry.catalog()) {
            Ok(catalog) => RpcResponse::ok(id, catalog),
            Err(e) => RpcResponse::fail(id, RpcError::new(rpc::INTERNAL_ERROR, e.to_string())),
        },
        "check_voice_usage" => {
            let params: mapper::CheckUsageParams = match serde_json::from_value(request.params) {
                Ok(p) => p,
                Err(e) => {
                    return RpcResponse::fail(id, RpcError::new(rpc::INVALID_PARAMS, e.to_string()))
                }
            };
            match state.ledger.peek(&params.access_key).await {
                Ok(record) => RpcResponse::ok(id, mapper::usage_to_reply(&record)),
                Err(
                    e @ (AccessError::MalformedKey
                    | AccessError::UnknownKey
                    | AccessError::KeyDisabled),
                ) => RpcResponse::fail(id, RpcError::new(rpc::AUTH_ERROR, e.to_string())),
                Err(e) => {
                    tracing::error!("usage lookup failed: {e}");
                    RpcResponse::fail(id, RpcError::new(rpc::INTERNAL_ERROR, e.to_string()))
                }
            }
        }
        "get_base_prompts" => match serde_json::to_value(prompts::catalog()) {
            Ok(catalog) => RpcResponse::ok(id, catalog),
            Err(e) => RpcResponse::fail(id, RpcError::new(rpc::INTERNAL_ERROR, e.to_string())),
        },
        other => RpcResponse::fail(
            id,
            RpcError::new(rpc::METHOD_NOT_FOUND, format!("unknown method: {other}")),
        ),
    }
}
