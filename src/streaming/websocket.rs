// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.

//! WebSocket server exposing the control surface

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, RwLock};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use super::StreamingConfig;
use crate::control::{Command, ControlSurface};

/// WebSocket control server
pub struct ControlServer {
    address: String,
    max_clients: usize,
    control: ControlSurface,
    clients: Arc<RwLock<HashMap<String, SocketAddr>>>,
}

impl ControlServer {
    /// Server for `config`'s address answering with `control`
    pub fn new(config: &StreamingConfig, control: ControlSurface) -> Self {
        Self {
            address: config.address(),
            max_clients: config.websocket_max_clients,
            control,
            clients: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Bind and serve in the background; returns the bound address
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.address).await?;
        let local_addr = listener.local_addr()?;

        info!("Control server listening on ws://{}", local_addr);

        let clients = self.clients.clone();
        let max_clients = self.max_clients;
        let control = self.control.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, addr)) => {
                                // Slot is reserved before the handshake
                                let client_id = uuid::Uuid::new_v4().to_string();
                                {
                                    let mut registry = clients.write().await;
                                    if registry.len() >= max_clients {
                                        warn!("Max clients reached, rejecting connection from {}", addr);
                                        tokio::spawn(reject(stream, addr));
                                        continue;
                                    }
                                    registry.insert(client_id.clone(), addr);
                                }

                                tokio::spawn(handle_connection(
                                    stream,
                                    addr,
                                    client_id,
                                    clients.clone(),
                                    control.clone(),
                                ));
                            }
                            Err(e) => {
                                error!("Accept error: {}", e);
                            }
                        }
                    }
                    _ = shutdown.recv() => {
                        info!("Control server shutting down");
                        break;
                    }
                }
            }
        });

        Ok(local_addr)
    }

    /// Connections currently holding a slot, including ones still in the handshake
    pub async fn get_client_count(&self) -> usize {
        self.clients.read().await.len()
    }
}

/// JSON reply for one text frame
pub fn respond(control: &ControlSurface, text: &str) -> String {
    match serde_json::from_str::<Command>(text) {
        Ok(command) => {
            let reply = control.execute(command);
            serde_json::to_string(&reply)
                .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
        }
        Err(e) => serde_json::json!({ "error": format!("unrecognised command: {}", e) }).to_string(),
    }
}

/// Complete the handshake only to tell the client it is over the cap
async fn reject(stream: TcpStream, addr: SocketAddr) {
    let mut ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!("Handshake with rejected client {} failed: {}", addr, e);
            return;
        }
    };

    let frame = CloseFrame {
        code: CloseCode::Policy,
        reason: "too many clients".into(),
    };
    if let Err(e) = ws_stream.close(Some(frame)).await {
        debug!("Failed to close rejected client {}: {}", addr, e);
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    client_id: String,
    clients: Arc<RwLock<HashMap<String, SocketAddr>>>,
    control: ControlSurface,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake failed for {}: {}", addr, e);
            clients.write().await.remove(&client_id);
            return;
        }
    };

    debug!("New control connection from {} (id: {})", addr, client_id);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                debug!("Received from {}: {}", addr, text);
                let reply = respond(&control, &text);
                if let Err(e) = ws_sender.send(Message::Text(reply)).await {
                    warn!("Failed to send to {}: {}", addr, e);
                    break;
                }
            }
            Ok(Message::Ping(data)) => {
                let _ = ws_sender.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => {
                debug!("Control connection closed by {}", addr);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket error from {}: {}", addr, e);
                break;
            }
        }
    }

    clients.write().await.remove(&client_id);
    debug!("Control client {} disconnected", addr);
}
