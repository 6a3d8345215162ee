//! WebSocket 实时推送
//!
//! 每个连接订阅事件总线，推送格式为 `{"event": "<name>", "data": <Donation>}`。
//! 客户端发来的消息只用于保持连接，不做处理。

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};

use crate::business::domain::DonationEvent;
use crate::presentation::routes::AppState;

pub async fn socket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    // 升级前订阅，避免漏掉握手期间发布的事件
    let events = state.bus.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, events))
}

async fn handle_socket(socket: WebSocket, mut events: broadcast::Receiver<DonationEvent>) {
    info!("🔌 WebSocket 客户端已连接");

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("⚠️ WebSocket 客户端处理过慢，跳过 {} 个事件", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    error!("事件序列化失败: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        debug!("WebSocket 发送任务结束");
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
        debug!("WebSocket 接收任务结束");
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("🔌 WebSocket 客户端已断开");
}
