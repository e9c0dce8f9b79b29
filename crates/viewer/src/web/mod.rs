// Browser front end: canvas surface, DOM listeners, stream socket, frame loop
//
// WebSocket callbacks only queue raw text; DOM handlers and the animation
// frame loop borrow the viewer for exactly one event at a time, so every
// state change happens run-to-completion on the page's single thread.
use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use glam::DVec2;
use protocol::packets::ServerPacket;
use wasm_bindgen::prelude::*;
use web_sys::{
    window, AddEventListenerOptions, CanvasRenderingContext2d, CloseEvent, HtmlCanvasElement,
    KeyboardEvent, MessageEvent, MouseEvent, WebSocket, WheelEvent,
};

use crate::camera::CanvasSize;
use crate::config::ViewerConfig;
use crate::network::Connection;
use crate::render::{DrawCommand, Surface};
use crate::view::{ViewController, ViewEvent};

const BACKGROUND: &str = "#000000";
const BODY_FILL: &str = "#ffffff";

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl Surface for CanvasSurface {
    fn clear(&mut self, canvas: CanvasSize) {
        self.ctx.set_fill_style_str(BACKGROUND);
        self.ctx
            .fill_rect(0.0, 0.0, f64::from(canvas.width), f64::from(canvas.height));
    }

    fn fill_circle(&mut self, command: &DrawCommand) {
        self.ctx.set_fill_style_str(BODY_FILL);
        self.ctx.begin_path();
        if self
            .ctx
            .arc(command.center.x, command.center.y, command.radius.max(0.0), 0.0, TAU)
            .is_ok()
        {
            self.ctx.fill();
        }
    }
}

struct Viewer {
    controller: ViewController,
    connection: Connection,
    surface: CanvasSurface,
}

impl Viewer {
    /// Apply queued stream frames, flush key presses, repaint if needed.
    fn tick(&mut self, inbox: &RefCell<Vec<String>>, closed: &Cell<bool>) {
        if closed.replace(false) {
            self.controller.dispatch(ViewEvent::Disconnected);
        }

        let frames = std::mem::take(&mut *inbox.borrow_mut());
        for text in frames {
            match ServerPacket::parse(&text) {
                Ok(ServerPacket::Ping) => {
                    if let Err(e) = self.connection.send_pong() {
                        web_sys::console::error_1(&format!("Pong failed: {:?}", e).into());
                    }
                }
                Ok(ServerPacket::Open(_)) => {
                    if let Err(e) = self.connection.send_connect() {
                        web_sys::console::error_1(&format!("Connect failed: {:?}", e).into());
                    }
                }
                Ok(packet) => {
                    if let Some(event) = packet.into_stream_event() {
                        self.controller.dispatch(event.into());
                    }
                }
                Err(e) => {
                    web_sys::console::warn_1(&format!("Bad stream packet: {}", e).into());
                }
            }
        }

        for press in self.controller.drain_outbound() {
            if let Err(e) = self.connection.send_button_press(press) {
                web_sys::console::error_1(&format!("button_press not sent: {:?}", e).into());
            }
        }

        if self.controller.take_redraw() {
            self.controller.paint(&mut self.surface);
        }
    }
}

struct ReconnectState {
    delay_ms: i32,
    max_delay_ms: i32,
    scheduled: bool,
}

/// Handle exposed to the page script.
#[wasm_bindgen]
pub struct ViewerHandle {
    viewer: Rc<RefCell<Viewer>>,
}

#[wasm_bindgen]
impl ViewerHandle {
    /// Attach to `canvas_id`, listen for drags on `container_id` and stream
    /// positions from `server_url`.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, container_id: &str, server_url: &str) -> Result<ViewerHandle, JsValue> {
        init();

        let document = window()
            .and_then(|w| w.document())
            .ok_or("No document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or("container not found")?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or("Failed to get 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let size = fit_canvas(&canvas);
        let controller = ViewController::new(ViewerConfig::default(), size)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let connection = Connection::new(server_url)?;

        let viewer = Rc::new(RefCell::new(Viewer {
            controller,
            connection,
            surface: CanvasSurface { ctx },
        }));
        let inbox = Rc::new(RefCell::new(Vec::new()));
        let closed = Rc::new(Cell::new(false));

        let ws = viewer.borrow().connection.websocket().clone();
        let reconnect_state = Rc::new(RefCell::new(ReconnectState {
            delay_ms: 1000,
            max_delay_ms: 5000,
            scheduled: false,
        }));
        attach_websocket_handlers(viewer.clone(), ws, inbox.clone(), closed.clone(), reconnect_state)?;
        setup_animation_loop(viewer.clone(), inbox, closed)?;
        setup_pointer_handlers(viewer.clone(), &canvas, &container)?;
        setup_key_handlers(viewer.clone())?;
        setup_resize_handler(viewer.clone(), canvas)?;

        Ok(ViewerHandle { viewer })
    }

    /// Stream session id, needed by the control API.
    pub fn session_id(&self) -> Option<String> {
        self.viewer.borrow().controller.session_id().map(str::to_string)
    }

    /// Lines for the coordinate read-out.
    pub fn overlay(&self) -> js_sys::Array {
        self.viewer
            .borrow()
            .controller
            .overlay()
            .into_iter()
            .map(JsValue::from)
            .collect()
    }

    pub fn body_count(&self) -> usize {
        self.viewer.borrow().controller.frame().len()
    }

    pub fn scale(&self) -> f64 {
        self.viewer.borrow().controller.viewport().scale()
    }
}

/// Match the backing store to the displayed size.
fn fit_canvas(canvas: &HtmlCanvasElement) -> CanvasSize {
    let width = canvas.client_width().max(1) as u32;
    let height = canvas.client_height().max(1) as u32;
    canvas.set_width(width);
    canvas.set_height(height);
    CanvasSize::new(width, height)
}

/// Mouse position relative to the canvas origin.
fn canvas_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> DVec2 {
    let rect = canvas.get_bounding_client_rect();
    DVec2::new(
        f64::from(event.client_x()) - rect.left(),
        f64::from(event.client_y()) - rect.top(),
    )
}

fn attach_websocket_handlers(
    viewer: Rc<RefCell<Viewer>>,
    ws: WebSocket,
    inbox: Rc<RefCell<Vec<String>>>,
    closed: Rc<Cell<bool>>,
    reconnect_state: Rc<RefCell<ReconnectState>>,
) -> Result<(), JsValue> {
    // onmessage - queue text, the frame loop decodes it
    {
        let inbox = inbox.clone();
        let onmessage = Closure::wrap(Box::new(move |event: MessageEvent| {
            if let Some(text) = event.data().as_string() {
                inbox.borrow_mut().push(text);
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    // onopen - reset reconnect delay
    {
        let state = reconnect_state.clone();
        let onopen = Closure::wrap(Box::new(move |_event: JsValue| {
            web_sys::console::log_1(&"Stream connected".into());
            if let Ok(mut state) = state.try_borrow_mut() {
                state.delay_ms = 1000;
                state.scheduled = false;
            }
        }) as Box<dyn FnMut(JsValue)>);
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    // onerror
    let onerror = Closure::wrap(Box::new(move |e: JsValue| {
        web_sys::console::error_1(&format!("WebSocket error: {:?}", e).into());
    }) as Box<dyn FnMut(JsValue)>);
    ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    // onclose - flag for the frame loop and schedule a reconnect
    let viewer_weak: Weak<RefCell<Viewer>> = Rc::downgrade(&viewer);
    let onclose = Closure::wrap(Box::new(move |event: CloseEvent| {
        web_sys::console::log_1(&format!("Stream closed: {}", event.code()).into());
        closed.set(true);

        let delay = {
            let mut state = reconnect_state.borrow_mut();
            if state.scheduled {
                return;
            }
            state.scheduled = true;
            let current = state.delay_ms;
            state.delay_ms = (state.delay_ms * 3 / 2).min(state.max_delay_ms);
            current
        };

        let Some(win) = web_sys::window() else {
            return;
        };
        let attempt_viewer = viewer_weak.clone();
        let attempt_inbox = inbox.clone();
        let attempt_closed = closed.clone();
        let attempt_state = reconnect_state.clone();
        let callback = Closure::wrap(Box::new(move || {
            let Some(viewer_rc) = attempt_viewer.upgrade() else {
                return;
            };
            let reconnected = match viewer_rc.try_borrow_mut() {
                Ok(mut viewer) => viewer.connection.reconnect(),
                Err(_) => Err(JsValue::from_str("viewer busy")),
            };
            attempt_state.borrow_mut().scheduled = false;
            match reconnected {
                Ok(new_ws) => {
                    if let Err(e) = attach_websocket_handlers(
                        viewer_rc.clone(),
                        new_ws,
                        attempt_inbox.clone(),
                        attempt_closed.clone(),
                        attempt_state.clone(),
                    ) {
                        web_sys::console::error_1(&format!("Failed to attach handlers: {:?}", e).into());
                    }
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("Reconnect failed: {:?}", e).into());
                }
            }
        }) as Box<dyn FnMut()>);
        let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        );
        callback.forget();
    }) as Box<dyn FnMut(CloseEvent)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    Ok(())
}

fn setup_animation_loop(
    viewer: Rc<RefCell<Viewer>>,
    inbox: Rc<RefCell<Vec<String>>>,
    closed: Rc<Cell<bool>>,
) -> Result<(), JsValue> {
    let window = window().ok_or("No window")?;

    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        viewer.borrow_mut().tick(&inbox, &closed);

        // Request next frame
        if let (Some(win), Some(callback)) = (web_sys::window(), f.borrow().as_ref()) {
            win.request_animation_frame(callback.as_ref().unchecked_ref()).ok();
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }

    Ok(())
}

fn setup_pointer_handlers(
    viewer: Rc<RefCell<Viewer>>,
    canvas: &HtmlCanvasElement,
    container: &web_sys::Element,
) -> Result<(), JsValue> {
    // Presses land on the container so overlaid panels see them too; only
    // presses whose target is the canvas itself start a pan.
    {
        let viewer = viewer.clone();
        let canvas = canvas.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            let target_is_canvas = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlCanvasElement>().ok())
                .is_some();
            viewer.borrow_mut().controller.dispatch(ViewEvent::PointerDown {
                position: canvas_point(&canvas, &event),
                target_is_canvas,
            });
        }) as Box<dyn FnMut(_)>);
        container.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let viewer = viewer.clone();
        let canvas = canvas.clone();
        let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
            viewer.borrow_mut().controller.dispatch(ViewEvent::PointerMove {
                position: canvas_point(&canvas, &event),
            });
        }) as Box<dyn FnMut(_)>);
        container.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    for (name, event) in [("mouseup", ViewEvent::PointerUp), ("mouseleave", ViewEvent::PointerLeave)] {
        let viewer = viewer.clone();
        let closure = Closure::wrap(Box::new(move |_event: MouseEvent| {
            viewer.borrow_mut().controller.dispatch(event.clone());
        }) as Box<dyn FnMut(_)>);
        container.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Wheel - non-passive so the page does not scroll
    {
        let canvas_for_point = canvas.clone();
        let closure = Closure::wrap(Box::new(move |event: WheelEvent| {
            event.prevent_default();
            viewer.borrow_mut().controller.dispatch(ViewEvent::Wheel {
                position: canvas_point(&canvas_for_point, &event),
                delta_y: event.delta_y(),
            });
        }) as Box<dyn FnMut(_)>);
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "wheel",
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        closure.forget();
    }

    Ok(())
}

fn setup_key_handlers(viewer: Rc<RefCell<Viewer>>) -> Result<(), JsValue> {
    let window = window().ok_or("No window")?;

    for (name, pressed) in [("keydown", true), ("keyup", false)] {
        let viewer = viewer.clone();
        let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
            viewer.borrow_mut().controller.dispatch(ViewEvent::Key {
                key: event.key(),
                pressed,
            });
        }) as Box<dyn FnMut(_)>);
        window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    Ok(())
}

/// Resize the canvas backing store when the window is resized.
fn setup_resize_handler(viewer: Rc<RefCell<Viewer>>, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
    let win = window().ok_or("No window")?;

    let closure = Closure::wrap(Box::new(move || {
        let size = fit_canvas(&canvas);
        viewer.borrow_mut().controller.dispatch(ViewEvent::Resized(size));
    }) as Box<dyn FnMut()>);

    win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();

    Ok(())
}
