// WebSocket connection to the simulation stream (Socket.IO text frames)
use protocol::packets::{build_button_press, socket_url, ClientPacket};
use protocol::ButtonPress;
use wasm_bindgen::prelude::*;
use web_sys::WebSocket;

pub struct Connection {
    ws: WebSocket,
    url: String,
}

impl Connection {
    pub fn new(server: &str) -> Result<Self, JsValue> {
        // Bare hosts follow the page protocol
        let is_https = web_sys::window()
            .and_then(|w| w.location().protocol().ok())
            .map(|p| p == "https:")
            .unwrap_or(false);
        let base = if is_https && !server.contains("://") {
            format!("https://{}", server)
        } else {
            server.to_string()
        };
        let url = socket_url(&base);

        web_sys::console::log_1(&format!("Connecting to: {}", url).into());
        let ws = WebSocket::new(&url)?;
        Ok(Self { ws, url })
    }

    pub fn websocket(&self) -> &WebSocket {
        &self.ws
    }

    pub fn reconnect(&mut self) -> Result<WebSocket, JsValue> {
        // Clean up old websocket
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();

        web_sys::console::log_1(&format!("Reconnecting to: {}", self.url).into());
        self.ws = WebSocket::new(&self.url)?;
        Ok(self.ws.clone())
    }

    fn send_text(&self, text: &str) -> Result<(), JsValue> {
        // OPEN state = 1
        if self.ws.ready_state() != 1 {
            return Err(JsValue::from_str("WebSocket not ready"));
        }
        self.ws.send_with_str(text)
    }

    /// Answer an engine ping.
    pub fn send_pong(&self) -> Result<(), JsValue> {
        self.send_text(&ClientPacket::Pong.encode())
    }

    /// Join the default namespace once the engine handshake arrived.
    pub fn send_connect(&self) -> Result<(), JsValue> {
        self.send_text(&ClientPacket::Connect.encode())
    }

    pub fn send_button_press(&self, press: ButtonPress) -> Result<(), JsValue> {
        self.send_text(&build_button_press(press))
    }
}
