//! View loop: the single task that owns and mutates view state.

use std::time::Duration;

use protocol::control::SimulationParams;
use protocol::{ButtonPress, StreamEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};
use viewer::{DrawCommand, ViewController, ViewEvent};

use crate::cli::parse_key_line;
use crate::config::Config;
use crate::control::{ControlClient, ControlError};
use crate::stream;

/// Session id a launch was sent for, and what the control API answered.
type LaunchOutcome = (String, Result<serde_json::Value, ControlError>);

/// Run until Ctrl-C. With `launch` set, the preset is started as soon as the
/// stream hands out a session id.
pub async fn run(config: Config, launch: Option<SimulationParams>) -> anyhow::Result<()> {
    let mut controller = ViewController::new(config.viewer.clone(), config.display.canvas())?;
    let control = ControlClient::new(
        &config.control.base_url,
        Duration::from_secs(config.control.timeout_secs),
    )?;

    let (event_tx, mut event_rx) = mpsc::channel::<StreamEvent>(64);
    let (press_tx, press_rx) = mpsc::channel::<ButtonPress>(64);
    let (launch_tx, mut launch_rx) = mpsc::channel::<LaunchOutcome>(1);
    let stream_task = tokio::spawn(stream::run(config.stream.clone(), event_tx, press_rx));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let status_secs = config.display.status_interval_secs;
    let mut status = tokio::time::interval(Duration::from_secs(status_secs.max(1)));

    let mut gate = LaunchGate::new(launch);
    let mut surface: Vec<DrawCommand> = Vec::new();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    break;
                };
                controller.dispatch(event.into());
                if let Some((params, sid)) = gate.ready(controller.session_id()) {
                    let control = control.clone();
                    let launch_tx = launch_tx.clone();
                    tokio::spawn(async move {
                        let result = control.launch(params, &sid).await;
                        let _ = launch_tx.send((sid, result)).await;
                    });
                }
            }
            Some((sid, result)) = launch_rx.recv() => {
                gate.finished(sid, result);
            }
            line = stdin.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match parse_key_line(&line) {
                        Some((key, pressed)) => controller.dispatch(ViewEvent::Key { key, pressed }),
                        None if line.trim().is_empty() => {}
                        None => warn!("Ignoring {:?}; type +key to press and -key to release", line),
                    },
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        warn!("stdin closed: {}", e);
                        stdin_open = false;
                    }
                }
            }
            _ = status.tick() => {
                if status_secs > 0 {
                    for line in controller.overlay() {
                        info!("{}", line);
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
        }

        after_event(&mut controller, &press_tx, &mut surface);
    }

    if config.control.stop_on_exit {
        if let Some(sid) = gate.launched() {
            match control.delete(sid).await {
                Ok(reply) => info!("Simulation stopped: {}", reply),
                Err(e) => error!("Failed to stop simulation: {}", e),
            }
        }
    }

    drop(press_tx);
    stream_task.abort();
    Ok(())
}

/// Flush queued presses and repaint if needed. Never waits.
fn after_event(
    controller: &mut ViewController,
    press_tx: &mpsc::Sender<ButtonPress>,
    surface: &mut Vec<DrawCommand>,
) {
    forward_presses(controller.drain_outbound(), press_tx);

    if controller.take_redraw() {
        controller.paint(surface);
        debug!(
            commands = surface.len(),
            scale = controller.viewport().scale(),
            version = controller.store().version(),
            "Repainted"
        );
    }
}

/// Hand presses to the stream task in order. While it is not reading (no
/// session, reconnect delay) the queue fills up and further presses are
/// dropped. Returns how many were dropped.
fn forward_presses(presses: Vec<ButtonPress>, press_tx: &mpsc::Sender<ButtonPress>) -> usize {
    let mut dropped = 0;
    for press in presses {
        match press_tx.try_send(press) {
            Ok(()) => {}
            Err(TrySendError::Full(press)) => {
                debug!(?press, "Press queue full");
                dropped += 1;
            }
            Err(TrySendError::Closed(press)) => {
                debug!(?press, "Stream task gone");
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        warn!(dropped, "Stream not accepting button presses, dropped");
    }
    dropped
}

/// One-shot preset launch. The preset is handed out for the first session
/// seen and never again, whether or not the launch succeeds.
#[derive(Debug, Default)]
struct LaunchGate {
    pending: Option<SimulationParams>,
    launched: Option<String>,
}

impl LaunchGate {
    fn new(pending: Option<SimulationParams>) -> Self {
        Self {
            pending,
            launched: None,
        }
    }

    /// Parameters and session to launch with, once a session exists.
    fn ready(&mut self, session_id: Option<&str>) -> Option<(SimulationParams, String)> {
        let sid = session_id?;
        let params = self.pending.take()?;
        Some((params, sid.to_string()))
    }

    fn finished(&mut self, session_id: String, result: Result<serde_json::Value, ControlError>) {
        match result {
            Ok(reply) => {
                info!("Simulation launched: {}", reply);
                self.launched = Some(session_id);
            }
            Err(e) => error!("Failed to launch simulation: {}", e),
        }
    }

    /// Session whose simulation this process started.
    fn launched(&self) -> Option<&str> {
        self.launched.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::templates::template;
    use protocol::Direction;
    use viewer::{CanvasSize, ViewerConfig};

    fn controller() -> ViewController {
        ViewController::new(ViewerConfig::default(), CanvasSize::new(800, 600)).unwrap()
    }

    fn key(key: &str, pressed: bool) -> ViewEvent {
        ViewEvent::Key {
            key: key.to_string(),
            pressed,
        }
    }

    fn connected(sid: &str) -> ViewEvent {
        StreamEvent::Connected {
            session_id: sid.to_string(),
        }
        .into()
    }

    #[tokio::test]
    async fn test_key_flood_without_session_keeps_loop_running() {
        let mut c = controller();
        let mut surface = Vec::new();
        // Nobody reads the receiver, as during a reconnect delay.
        let (press_tx, mut press_rx) = mpsc::channel(64);

        for i in 0..200 {
            c.dispatch(key("w", i % 2 == 0));
            after_event(&mut c, &press_tx, &mut surface);
        }

        c.dispatch(ViewEvent::FrameReceived {
            payload: r#"[{"a": {"x": 1, "y": 2}}]"#.to_string(),
        });
        after_event(&mut c, &press_tx, &mut surface);
        assert_eq!(c.frame().len(), 1);
        assert_eq!(surface.len(), 1);

        let first = press_rx.recv().await.unwrap();
        assert_eq!((first.direction, first.is_pressed), (Direction::Down, true));
        let mut queued = 1;
        while press_rx.try_recv().is_ok() {
            queued += 1;
        }
        assert_eq!(queued, 64);
    }

    #[tokio::test]
    async fn test_presses_forwarded_in_order() {
        let mut c = controller();
        let (press_tx, mut press_rx) = mpsc::channel(64);
        for (k, pressed) in [("w", true), ("a", true), ("w", false), ("d", true)] {
            c.dispatch(key(k, pressed));
        }
        assert_eq!(forward_presses(c.drain_outbound(), &press_tx), 0);
        drop(press_tx);

        let mut seen = Vec::new();
        while let Some(press) = press_rx.recv().await {
            seen.push((press.direction, press.is_pressed));
        }
        assert_eq!(
            seen,
            vec![
                (Direction::Down, true),
                (Direction::Left, true),
                (Direction::Down, false),
                (Direction::Right, true),
            ]
        );
    }

    #[test]
    fn test_closed_stream_drops_presses() {
        let (press_tx, press_rx) = mpsc::channel(4);
        drop(press_rx);
        let press = ButtonPress {
            is_pressed: true,
            direction: Direction::Up,
        };
        assert_eq!(forward_presses(vec![press, press], &press_tx), 2);
    }

    #[test]
    fn test_launch_waits_for_session_and_fires_once() {
        let mut c = controller();
        let mut gate = LaunchGate::new(template("binary-stars").map(|t| t.params));

        assert!(gate.ready(c.session_id()).is_none());

        c.dispatch(connected("first"));
        let (params, sid) = gate.ready(c.session_id()).unwrap();
        assert_eq!(sid, "first");
        assert!(!params.space_objects.is_empty());
        gate.finished(sid, Ok(serde_json::json!({ "status": "ok" })));
        assert_eq!(gate.launched(), Some("first"));

        c.dispatch(StreamEvent::Disconnected.into());
        c.dispatch(connected("second"));
        assert!(gate.ready(c.session_id()).is_none());
        assert_eq!(gate.launched(), Some("first"));
    }

    #[test]
    fn test_failed_launch_is_not_retried() {
        let mut c = controller();
        let mut gate = LaunchGate::new(Some(SimulationParams::default()));
        c.dispatch(connected("abc"));

        let (_, sid) = gate.ready(c.session_id()).unwrap();
        gate.finished(
            sid,
            Err(ControlError::Status {
                endpoint: "launch_simulation",
                status: 500,
                body: "boom".to_string(),
            }),
        );
        assert_eq!(gate.launched(), None);
        assert!(gate.ready(c.session_id()).is_none());
    }

    #[test]
    fn test_watch_never_launches() {
        let mut c = controller();
        let mut gate = LaunchGate::new(None);
        c.dispatch(connected("abc"));
        assert!(gate.ready(c.session_id()).is_none());
        assert_eq!(gate.launched(), None);
    }
}
