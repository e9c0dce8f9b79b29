//! Connection task for the simulation stream.
//!
//! Owns the WebSocket, answers engine heartbeats, forwards the events the
//! viewer cares about and writes queued button presses. It never touches view
//! state: events cross to the view loop over a channel.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use protocol::packets::{build_button_press, socket_url, ClientPacket, ServerPacket};
use protocol::{ButtonPress, StreamEvent};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::config::StreamConfig;

/// Keep the stream up until the view loop goes away, reconnecting with a
/// growing delay.
pub async fn run(
    config: StreamConfig,
    events: mpsc::Sender<StreamEvent>,
    mut presses: mpsc::Receiver<ButtonPress>,
) {
    let url = socket_url(&config.url);
    let mut delay_ms = config.reconnect_delay_ms;

    loop {
        match session(&url, &events, &mut presses, &mut delay_ms, config.reconnect_delay_ms).await {
            Ok(()) => info!("Stream closed"),
            Err(e) => warn!("Stream error: {}", e),
        }
        if events.send(StreamEvent::Disconnected).await.is_err() {
            return;
        }

        info!("Reconnecting in {} ms", delay_ms);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        delay_ms = next_delay(delay_ms, config.max_reconnect_delay_ms);

        // Presses typed while offline are stale by now
        let stale = discard_queued(&mut presses);
        if stale > 0 {
            debug!(stale, "Discarded presses queued while disconnected");
        }
    }
}

fn next_delay(current: u64, max: u64) -> u64 {
    (current.saturating_mul(3) / 2).min(max).max(1)
}

fn discard_queued(presses: &mut mpsc::Receiver<ButtonPress>) -> usize {
    let mut count = 0;
    while presses.try_recv().is_ok() {
        count += 1;
    }
    count
}

async fn session(
    url: &str,
    events: &mpsc::Sender<StreamEvent>,
    presses: &mut mpsc::Receiver<ButtonPress>,
    delay_ms: &mut u64,
    initial_delay_ms: u64,
) -> anyhow::Result<()> {
    let (ws_stream, _) = connect_async(url).await?;
    info!("Connected to {}", url);
    *delay_ms = initial_delay_ms;

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match ServerPacket::parse(text.as_str()) {
                            Ok(ServerPacket::Ping) => {
                                write.send(Message::Text(ClientPacket::Pong.encode().into())).await?;
                            }
                            Ok(ServerPacket::Open(open)) => {
                                debug!(sid = %open.sid, ping_interval = open.ping_interval, "Engine handshake");
                                write.send(Message::Text(ClientPacket::Connect.encode().into())).await?;
                            }
                            Ok(ServerPacket::ConnectError(detail)) => {
                                warn!("Namespace connect refused: {}", detail);
                            }
                            Ok(packet) => {
                                if let Some(event) = packet.into_stream_event() {
                                    if events.send(event).await.is_err() {
                                        return Ok(());
                                    }
                                }
                            }
                            Err(e) => warn!("Bad stream packet: {}", e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Err(e)) => return Err(e.into()),
                    _ => {}
                }
            }
            press = presses.recv() => {
                let Some(press) = press else {
                    return Ok(());
                };
                debug!(?press, "Sending button_press");
                write.send(Message::Text(build_button_press(press).into())).await?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_to_ceiling() {
        let mut delay = 1000;
        let mut seen = Vec::new();
        for _ in 0..6 {
            delay = next_delay(delay, 5000);
            seen.push(delay);
        }
        assert_eq!(seen, vec![1500, 2250, 3375, 5000, 5000, 5000]);
    }

    #[test]
    fn test_discard_queued_empties_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let press = ButtonPress {
            is_pressed: true,
            direction: protocol::Direction::Left,
        };
        for _ in 0..8 {
            tx.try_send(press).unwrap();
        }
        assert_eq!(discard_queued(&mut rx), 8);
        assert_eq!(discard_queued(&mut rx), 0);
        assert!(tx.try_send(press).is_ok());
    }
}
