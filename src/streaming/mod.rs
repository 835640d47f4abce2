//! Streaming module - WebSocket control server

mod websocket;

pub use websocket::*;

use serde::{Deserialize, Serialize};

/// Control server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Enable WebSocket server
    pub websocket_enabled: bool,
    /// Bind address
    pub websocket_bind: String,
    /// Port; 0 picks a free one
    pub websocket_port: u16,
    /// Simultaneous connections, handshakes included
    pub websocket_max_clients: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            websocket_enabled: true,
            websocket_bind: "0.0.0.0".to_string(),
            websocket_port: 8765,
            websocket_max_clients: 32,
        }
    }
}

impl StreamingConfig {
    /// `bind:port` for the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.websocket_bind, self.websocket_port)
    }
}
