//! Reconnecting WebSocket client for the chat endpoint.
//!
//! One [`ChatSocket`] owns at most one live transport handle. Abnormal
//! closes trigger exponential-backoff reconnects; a normal close (code
//! 1000) never does. Messages sent while offline are queued and flushed
//! in order when the connection opens.

mod emitter;
mod reconnect;

pub use emitter::ListenerId;
pub use reconnect::{ReconnectPolicy, RetryDecision};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use gloo_timers::callback::{Interval, Timeout};
use shared::models::{ClientFrame, ServerFrame};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::{api, auth};
use emitter::Emitter;

const HEARTBEAT_INTERVAL_MS: u32 = 30_000;
const NORMAL_CLOSE: u16 = 1000;

/// Events delivered to socket listeners.
#[derive(Debug, Clone)]
pub enum SocketEvent {
    /// The transport opened and the outbound queue was flushed.
    Connected,
    /// The transport closed.
    Disconnected { code: u16, reason: String },
    /// A reconnect attempt is about to start.
    Reconnecting { attempt: u32 },
    /// The retry budget is spent. Emitted once per outage.
    ReconnectFailed,
    /// A local failure: transport error, send while offline, bad URL.
    Error { message: String },
    /// A typed frame from the server.
    Frame(ServerFrame),
    /// An inbound frame the client does not understand, forwarded as-is.
    Raw(String),
}

/// Subscription key; one per [`SocketEvent`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    Reconnecting,
    ReconnectFailed,
    Error,
    Frame,
    Raw,
}

impl SocketEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SocketEvent::Connected => EventKind::Connected,
            SocketEvent::Disconnected { .. } => EventKind::Disconnected,
            SocketEvent::Reconnecting { .. } => EventKind::Reconnecting,
            SocketEvent::ReconnectFailed => EventKind::ReconnectFailed,
            SocketEvent::Error { .. } => EventKind::Error,
            SocketEvent::Frame(_) => EventKind::Frame,
            SocketEvent::Raw(_) => EventKind::Raw,
        }
    }
}

/// Outcome of decoding one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A frame with a known `type` tag.
    Frame(ServerFrame),
    /// Valid JSON with an unknown or missing tag.
    Unknown(serde_json::Value),
    /// Not JSON at all.
    Text(String),
}

/// Decode without ever dropping a frame: unknown tags and plain text are
/// preserved so listeners can still see them.
pub(crate) fn decode_frame(raw: &str) -> Decoded {
    match serde_json::from_str::<ServerFrame>(raw) {
        Ok(frame) => Decoded::Frame(frame),
        Err(_) => match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(value) => Decoded::Unknown(value),
            Err(_) => Decoded::Text(raw.to_string()),
        },
    }
}

struct SocketHandlers {
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

struct Inner {
    ws: Option<WebSocket>,
    // Bumped each time a new transport is created. Callbacks capture the
    // value current at creation and ignore events from older transports.
    generation: u64,
    connected: bool,
    policy: ReconnectPolicy,
    queue: VecDeque<ClientFrame>,
    emitter: Emitter<EventKind, SocketEvent>,
    heartbeat: Option<Interval>,
    retry: Option<Timeout>,
    handlers: Option<SocketHandlers>,
    // Previous generation of closures, kept alive so a straggling close
    // event from a replaced transport cannot hit a dropped callback.
    retired_handlers: Option<SocketHandlers>,
}

/// The reconnecting chat socket. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ChatSocket {
    inner: Rc<RefCell<Inner>>,
}

impl ChatSocket {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                ws: None,
                generation: 0,
                connected: false,
                policy: ReconnectPolicy::new(),
                queue: VecDeque::new(),
                emitter: Emitter::new(),
                heartbeat: None,
                retry: None,
                handlers: None,
                retired_handlers: None,
            })),
        }
    }

    /// Register a listener. Listeners for the same kind fire in
    /// registration order.
    pub fn on(&self, kind: EventKind, handler: impl Fn(&SocketEvent) + 'static) -> ListenerId {
        self.inner.borrow_mut().emitter.on(kind, handler)
    }

    /// Remove a listener registered with [`ChatSocket::on`].
    pub fn off(&self, kind: EventKind, id: ListenerId) {
        self.inner.borrow_mut().emitter.off(kind, id);
    }

    pub fn is_connected(&self) -> bool {
        self.inner.borrow().connected
    }

    /// Open the transport using the stored session. Idempotent: a second
    /// call while a handle exists does nothing and reports success.
    /// Returns `false` when no transport could be created.
    pub fn connect(&self) -> bool {
        if self.inner.borrow().ws.is_some() {
            return true;
        }

        let Some(profile) = auth::profile() else {
            self.emit(&SocketEvent::Error {
                message: "no stored session".to_string(),
            });
            return false;
        };
        let Some(token) = auth::token() else {
            self.emit(&SocketEvent::Error {
                message: "no stored session".to_string(),
            });
            return false;
        };
        let Some(url) = api::websocket_url(&profile.login, &token) else {
            self.emit(&SocketEvent::Error {
                message: "cannot build websocket url".to_string(),
            });
            return false;
        };

        let ws = match WebSocket::new(&url) {
            Ok(ws) => ws,
            Err(err) => {
                web_sys::console::error_2(&"WebSocket creation failed:".into(), &err);
                self.emit(&SocketEvent::Error {
                    message: "websocket creation failed".to_string(),
                });
                return false;
            }
        };

        let generation = {
            let mut state = self.inner.borrow_mut();
            state.generation += 1;
            state.generation
        };

        let weak = Rc::downgrade(&self.inner);
        let on_open = {
            let weak = weak.clone();
            Closure::wrap(Box::new(move || handle_open(&weak, generation)) as Box<dyn FnMut()>)
        };
        let on_message = {
            let weak = weak.clone();
            Closure::wrap(
                Box::new(move |event: MessageEvent| handle_message(&weak, generation, &event))
                    as Box<dyn FnMut(MessageEvent)>,
            )
        };
        let on_error = {
            let weak = weak.clone();
            Closure::wrap(
                Box::new(move |event: Event| handle_error(&weak, generation, &event))
                    as Box<dyn FnMut(Event)>,
            )
        };
        let on_close = {
            let weak = weak.clone();
            Closure::wrap(
                Box::new(move |event: CloseEvent| handle_close(&weak, generation, &event))
                    as Box<dyn FnMut(CloseEvent)>,
            )
        };

        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        ws.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        let mut state = self.inner.borrow_mut();
        state.ws = Some(ws);
        state.retired_handlers = state.handlers.take();
        state.handlers = Some(SocketHandlers {
            _on_open: on_open,
            _on_message: on_message,
            _on_error: on_error,
            _on_close: on_close,
        });
        true
    }

    /// Close the transport with a normal close and spend the retry budget
    /// so nothing reconnects behind the caller's back.
    pub fn disconnect(&self) {
        let ws = {
            let mut state = self.inner.borrow_mut();
            state.policy.exhaust();
            state.retry = None;
            state.heartbeat = None;
            state.connected = false;
            state.ws.take()
        };
        if let Some(ws) = ws {
            if ws
                .close_with_code_and_reason(NORMAL_CLOSE, "client disconnect")
                .is_err()
            {
                web_sys::console::warn_1(&"websocket close failed".into());
            }
        }
    }

    /// Send one frame. While offline the frame is queued, an `Error`
    /// event fires, and `false` is returned.
    pub fn send(&self, frame: ClientFrame) -> bool {
        let transport = {
            let state = self.inner.borrow();
            if state.connected { state.ws.clone() } else { None }
        };

        if let Some(ws) = transport {
            match serde_json::to_string(&frame) {
                Ok(raw) => {
                    if ws.send_with_str(&raw).is_ok() {
                        return true;
                    }
                    web_sys::console::warn_1(&"websocket send failed, queueing".into());
                }
                Err(err) => {
                    web_sys::console::error_1(&format!("frame serialization failed: {err}").into());
                    self.emit(&SocketEvent::Error {
                        message: "frame serialization failed".to_string(),
                    });
                    return false;
                }
            }
        }

        self.inner.borrow_mut().queue.push_back(frame);
        self.emit(&SocketEvent::Error {
            message: "not connected, message queued".to_string(),
        });
        false
    }

    pub fn send_user_message(&self, message: &str) -> bool {
        self.send(ClientFrame::UserToAdmin {
            message: message.to_string(),
        })
    }

    pub fn send_admin_message(&self, to_user: &str, message: &str) -> bool {
        self.send(ClientFrame::AdminToUser {
            to_user: to_user.to_string(),
            message: message.to_string(),
        })
    }

    pub fn send_broadcast(&self, message: &str) -> bool {
        self.send(ClientFrame::Broadcast {
            message: message.to_string(),
        })
    }

    pub fn request_history(&self, with_user: &str, limit: u32, offset: u32) -> bool {
        self.send(ClientFrame::GetConversationHistory {
            with_user: with_user.to_string(),
            limit,
            offset,
        })
    }

    pub fn request_conversations(&self) -> bool {
        self.send(ClientFrame::GetConversations)
    }

    pub fn mark_as_read(&self, sender_id: &str) -> bool {
        self.send(ClientFrame::MarkAsRead {
            sender_id: sender_id.to_string(),
        })
    }

    pub fn request_connected_users(&self) -> bool {
        self.send(ClientFrame::GetConnectedUsers)
    }

    fn emit(&self, event: &SocketEvent) {
        emit_from(&self.inner, event);
    }
}

impl Default for ChatSocket {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot listeners, drop the borrow, then dispatch. Listeners may call
/// back into the socket freely.
fn emit_from(inner: &Rc<RefCell<Inner>>, event: &SocketEvent) {
    let handlers = inner.borrow().emitter.handlers(event.kind());
    for handler in handlers {
        handler(event);
    }
}

/// Mark the socket connected, restore the retry budget, and flush queued
/// frames in order through `transmit` before listeners get to send.
fn finish_open(state: &mut Inner, mut transmit: impl FnMut(&str)) {
    state.connected = true;
    state.policy.reset();
    state.retry = None;
    while let Some(frame) = state.queue.pop_front() {
        match serde_json::to_string(&frame) {
            Ok(raw) => transmit(&raw),
            Err(err) => {
                web_sys::console::error_1(&format!("queued frame dropped: {err}").into());
            }
        }
    }
}

fn handle_open(weak: &Weak<RefCell<Inner>>, generation: u64) {
    let Some(inner) = weak.upgrade() else { return };
    if inner.borrow().generation != generation {
        return;
    }
    web_sys::console::log_1(&"WebSocket connected".into());
    {
        let mut state = inner.borrow_mut();

        let heartbeat_weak = weak.clone();
        state.heartbeat = Some(Interval::new(HEARTBEAT_INTERVAL_MS, move || {
            send_heartbeat(&heartbeat_weak);
        }));

        let ws = state.ws.clone();
        finish_open(&mut state, |raw| {
            if let Some(ws) = &ws {
                if ws.send_with_str(raw).is_err() {
                    web_sys::console::warn_1(&"queued frame send failed".into());
                }
            }
        });
    }
    emit_from(&inner, &SocketEvent::Connected);
}

fn send_heartbeat(weak: &Weak<RefCell<Inner>>) {
    let Some(inner) = weak.upgrade() else { return };
    let state = inner.borrow();
    if !state.connected {
        return;
    }
    if let Some(ws) = &state.ws {
        if let Ok(raw) = serde_json::to_string(&ClientFrame::Ping) {
            let _ = ws.send_with_str(&raw);
        }
    }
}

fn handle_message(weak: &Weak<RefCell<Inner>>, generation: u64, event: &MessageEvent) {
    let Some(inner) = weak.upgrade() else { return };
    if inner.borrow().generation != generation {
        return;
    }
    let Some(raw) = event.data().as_string() else {
        return;
    };
    match decode_frame(&raw) {
        // Heartbeat replies never reach listeners.
        Decoded::Frame(ServerFrame::Pong) => {}
        Decoded::Frame(frame) => emit_from(&inner, &SocketEvent::Frame(frame)),
        Decoded::Unknown(value) => {
            let tag = value
                .get("type")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<none>");
            web_sys::console::warn_1(&format!("unknown message type: {tag}").into());
            emit_from(&inner, &SocketEvent::Raw(raw));
        }
        Decoded::Text(text) => emit_from(&inner, &SocketEvent::Raw(text)),
    }
}

fn handle_error(weak: &Weak<RefCell<Inner>>, generation: u64, _event: &Event) {
    let Some(inner) = weak.upgrade() else { return };
    if inner.borrow().generation != generation {
        return;
    }
    web_sys::console::error_1(&"WebSocket error".into());
    emit_from(&inner, &SocketEvent::Error {
        message: "websocket error".to_string(),
    });
}

fn handle_close(weak: &Weak<RefCell<Inner>>, generation: u64, event: &CloseEvent) {
    let Some(inner) = weak.upgrade() else { return };
    let code = event.code();
    let reason = event.reason();
    web_sys::console::log_1(&format!("WebSocket closed: {code} {reason}").into());
    close_transition(&inner, generation, code, reason);
}

/// Tear down the connection state and decide on a reconnect. Close events
/// from a transport that has since been replaced are dropped; without the
/// generation check a straggling close would wipe the current handle.
fn close_transition(inner: &Rc<RefCell<Inner>>, generation: u64, code: u16, reason: String) {
    {
        let mut state = inner.borrow_mut();
        if state.generation != generation {
            return;
        }
        state.connected = false;
        state.ws = None;
        state.heartbeat = None;
    }
    emit_from(inner, &SocketEvent::Disconnected { code, reason });

    if code == NORMAL_CLOSE {
        return;
    }

    let decision = inner.borrow_mut().policy.record_failure();
    match decision {
        RetryDecision::Retry { attempt, delay_ms } => {
            web_sys::console::log_1(
                &format!("reconnecting in {delay_ms} ms (attempt {attempt})").into(),
            );
            let timer_weak = Rc::downgrade(inner);
            let timer = Timeout::new(delay_ms, move || {
                let Some(inner) = timer_weak.upgrade() else {
                    return;
                };
                inner.borrow_mut().retry = None;
                emit_from(&inner, &SocketEvent::Reconnecting { attempt });
                let socket = ChatSocket { inner };
                socket.connect();
            });
            inner.borrow_mut().retry = Some(timer);
        }
        RetryDecision::GiveUp => emit_from(inner, &SocketEvent::ReconnectFailed),
        RetryDecision::Stop => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_frames_decode() {
        let decoded = decode_frame(r#"{ "type": "pong", "timestamp": "t" }"#);
        assert_eq!(decoded, Decoded::Frame(ServerFrame::Pong));

        let decoded = decode_frame(
            r#"{ "type": "error", "message": "boom", "timestamp": "t" }"#,
        );
        assert_eq!(
            decoded,
            Decoded::Frame(ServerFrame::Error {
                message: "boom".to_string()
            })
        );
    }

    #[test]
    fn unknown_tags_fall_back_to_json() {
        let decoded = decode_frame(r#"{ "type": "server_maintenance", "eta": 5 }"#);
        match decoded {
            Decoded::Unknown(value) => assert_eq!(value["type"], "server_maintenance"),
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn non_json_falls_back_to_text() {
        assert_eq!(
            decode_frame("plain greeting"),
            Decoded::Text("plain greeting".to_string())
        );
    }

    #[test]
    fn event_kinds_cover_every_variant() {
        assert_eq!(SocketEvent::Connected.kind(), EventKind::Connected);
        assert_eq!(
            SocketEvent::Disconnected {
                code: 1006,
                reason: String::new()
            }
            .kind(),
            EventKind::Disconnected
        );
        assert_eq!(
            SocketEvent::Reconnecting { attempt: 1 }.kind(),
            EventKind::Reconnecting
        );
        assert_eq!(SocketEvent::ReconnectFailed.kind(), EventKind::ReconnectFailed);
        assert_eq!(
            SocketEvent::Error {
                message: String::new()
            }
            .kind(),
            EventKind::Error
        );
        assert_eq!(
            SocketEvent::Frame(ServerFrame::Pong).kind(),
            EventKind::Frame
        );
        assert_eq!(SocketEvent::Raw(String::new()).kind(), EventKind::Raw);
    }

    #[test]
    fn queue_preserves_fifo_order() {
        let socket = ChatSocket::new();
        socket.send_user_message("first");
        socket.send_user_message("second");
        let queued: Vec<_> = socket.inner.borrow().queue.iter().cloned().collect();
        assert_eq!(queued, vec![
            ClientFrame::UserToAdmin {
                message: "first".to_string()
            },
            ClientFrame::UserToAdmin {
                message: "second".to_string()
            },
        ]);
    }

    #[test]
    fn offline_send_reports_failure_and_emits_error() {
        let socket = ChatSocket::new();
        let errors = Rc::new(RefCell::new(0));
        {
            let errors = errors.clone();
            socket.on(EventKind::Error, move |_| *errors.borrow_mut() += 1);
        }
        assert!(!socket.send_user_message("hello"));
        assert_eq!(*errors.borrow(), 1);
        assert!(!socket.is_connected());
    }

    #[test]
    fn open_transition_flushes_queue_in_fifo_order() {
        let socket = ChatSocket::new();
        socket.send_user_message("first");
        socket.send_broadcast("second");

        let mut sent = Vec::new();
        finish_open(&mut socket.inner.borrow_mut(), |raw| {
            sent.push(raw.to_string());
        });

        assert_eq!(sent, vec![
            r#"{"type":"user_to_admin","message":"first"}"#.to_string(),
            r#"{"type":"broadcast","message":"second"}"#.to_string(),
        ]);
        assert!(socket.inner.borrow().queue.is_empty());
        assert!(socket.is_connected());
    }

    #[test]
    fn open_transition_restores_the_retry_budget() {
        let socket = ChatSocket::new();
        {
            let mut state = socket.inner.borrow_mut();
            for _ in 0..3 {
                state.policy.record_failure();
            }
        }
        finish_open(&mut socket.inner.borrow_mut(), |_| {});
        assert_eq!(
            socket.inner.borrow_mut().policy.record_failure(),
            RetryDecision::Retry {
                attempt: 1,
                delay_ms: 1_000
            }
        );
    }

    #[test]
    fn disconnect_spends_the_retry_budget() {
        let socket = ChatSocket::new();
        socket.disconnect();
        assert!(!socket.is_connected());
        assert!(socket.inner.borrow().retry.is_none());
        assert_eq!(
            socket.inner.borrow_mut().policy.record_failure(),
            RetryDecision::Stop
        );
    }

    #[test]
    fn stale_close_events_are_ignored() {
        let socket = ChatSocket::new();
        {
            let mut state = socket.inner.borrow_mut();
            state.generation = 2;
            state.connected = true;
        }
        let closes = Rc::new(RefCell::new(0));
        {
            let closes = closes.clone();
            socket.on(EventKind::Disconnected, move |_| *closes.borrow_mut() += 1);
        }

        // A close from the replaced transport carries the old generation.
        close_transition(&socket.inner, 1, 1006, String::new());

        assert!(socket.is_connected());
        assert_eq!(*closes.borrow(), 0);
    }

    #[test]
    fn current_close_tears_down_and_notifies_once() {
        let socket = ChatSocket::new();
        {
            let mut state = socket.inner.borrow_mut();
            state.generation = 1;
            state.connected = true;
        }
        let closes = Rc::new(RefCell::new(0));
        {
            let closes = closes.clone();
            socket.on(EventKind::Disconnected, move |_| *closes.borrow_mut() += 1);
        }

        close_transition(&socket.inner, 1, NORMAL_CLOSE, "client disconnect".to_string());

        assert!(!socket.is_connected());
        assert_eq!(*closes.borrow(), 1);
        assert!(socket.inner.borrow().retry.is_none());
    }

    #[test]
    fn spent_budget_reports_failure_once() {
        let socket = ChatSocket::new();
        {
            let mut state = socket.inner.borrow_mut();
            state.generation = 1;
            for _ in 0..reconnect::MAX_ATTEMPTS {
                state.policy.record_failure();
            }
        }
        let failures = Rc::new(RefCell::new(0));
        {
            let failures = failures.clone();
            socket.on(EventKind::ReconnectFailed, move |_| {
                *failures.borrow_mut() += 1;
            });
        }

        close_transition(&socket.inner, 1, 1006, String::new());
        close_transition(&socket.inner, 1, 1006, String::new());

        assert_eq!(*failures.borrow(), 1);
    }
}
