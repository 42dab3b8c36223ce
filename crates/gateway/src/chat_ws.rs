//! `GET /ws/chat`: one reply frame per inbound text frame.
//!
//! Each text frame starts a fresh conversation. Turns run one at a time in a
//! spawned task; frames arriving mid-turn wait in a queue. When the client
//! goes away the current turn is cancelled and awaited before the session
//! ends.

use axum::extract::State;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::SharedState;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    info!("WebSocket connection established");

    let (sink, mut stream) = socket.split();
    let (queue, inbox) = mpsc::unbounded_channel::<String>();
    let cancel = CancellationToken::new();

    let worker = tokio::spawn(run_turns(state, inbox, sink, cancel.clone()));

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(WsMessage::Text(text)) => {
                debug!(len = text.len(), "Chat message received");
                if queue.send(text.to_string()).is_err() {
                    break;
                }
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => continue, // ignore binary, ping, pong
            Err(e) => {
                debug!(error = %e, "WebSocket receive failed");
                break;
            }
        }
    }

    cancel.cancel();
    drop(queue);
    if let Err(e) = worker.await {
        warn!(error = %e, "Chat worker ended abnormally");
    }

    info!("WebSocket connection closed");
}

/// Process queued messages strictly in order, one turn at a time.
async fn run_turns(
    state: SharedState,
    mut inbox: mpsc::UnboundedReceiver<String>,
    mut sink: SplitSink<WebSocket, WsMessage>,
    cancel: CancellationToken,
) {
    while let Some(text) = inbox.recv().await {
        if cancel.is_cancelled() {
            break;
        }

        let Some(reply) = taskpilot_agent::channel::reply(&state.agent, &text, &cancel).await else {
            break;
        };

        if sink.send(WsMessage::Text(reply.into())).await.is_err() {
            debug!("Client disconnected before the reply was sent");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::build_router;
    use crate::test_support::state_with;
    use futures::{SinkExt, StreamExt};
    use serde_json::json;
    use taskpilot_agent::AgentTurn;
    use taskpilot_core::message::ToolCallRequest;
    use taskpilot_core::task::TaskStore;
    use tokio_tungstenite::tungstenite::Message;

    async fn serve(state: crate::SharedState) -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = build_router(state, &[]);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn next_text<S>(ws: &mut S) -> String
    where
        S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        loop {
            match ws.next().await.unwrap().unwrap() {
                Message::Text(text) => return text.to_string(),
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn one_reply_per_frame_in_order() {
        let addr = serve(state_with(Vec::new())).await;
        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/chat"))
            .await
            .unwrap();

        ws.send(Message::Text("first".into())).await.unwrap();
        ws.send(Message::Binary(vec![1, 2, 3].into())).await.unwrap();
        ws.send(Message::Text("second".into())).await.unwrap();

        assert_eq!(next_text(&mut ws).await, "echo: first");
        assert_eq!(next_text(&mut ws).await, "echo: second");

        ws.close(None).await.unwrap();
    }

    #[tokio::test]
    async fn chat_turn_creates_a_task() {
        let arguments = match json!({"title": "Buy milk"}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        let state = state_with(vec![
            AgentTurn::ToolRequest(vec![ToolCallRequest::new("c1", "create_task", arguments)]),
            AgentTurn::Answer("Created.".into()),
        ]);
        let store = state.store.clone();
        let addr = serve(state).await;

        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/chat"))
            .await
            .unwrap();
        ws.send(Message::Text("Remind me to buy milk".into())).await.unwrap();

        assert_eq!(next_text(&mut ws).await, "Created.");
        let tasks = store.list(Default::default()).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
    }

    #[tokio::test]
    async fn empty_answer_gets_fallback_text() {
        let addr = serve(state_with(vec![AgentTurn::Answer(String::new())])).await;
        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/chat"))
            .await
            .unwrap();

        ws.send(Message::Text("hello?".into())).await.unwrap();
        assert_eq!(next_text(&mut ws).await, "No response from AI agent.");
    }
}
