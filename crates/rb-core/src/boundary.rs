//! Boundary - typed message seam between the front end and the backend
//!
//! The front end never touches backend memory. Everything crosses this
//! boundary as one of three primitives: fire-and-forget events, topic
//! subscriptions, and request/response invocations. [`EventBus`] is the
//! in-process implementation; it queues everything and dispatches on
//! [`EventBus::pump`], one handler at a time, in FIFO order.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{BridgeError, Result};
use crate::joypad::{Joypad, LogicalButton};

/// Upper bound on dispatch rounds for [`EventBus::run_until_idle`]
pub const MAX_IDLE_ROUNDS: usize = 64;

/// Identifier of an outstanding `invoke`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Subscription key for boundary events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// UI -> backend button-state command
    SetButton,
    /// backend -> UI frame-rendered notification
    Render,
    /// backend -> UI "what is the state of this button"
    RequestInput(LogicalButton),
    /// UI -> backend answer to `RequestInput`
    ReceiveInput(LogicalButton),
}

impl Topic {
    /// Event name as it appears on the wire
    pub fn wire_name(&self) -> String {
        match self {
            Topic::SetButton => "SET_BUTTON".to_string(),
            Topic::Render => "RENDER".to_string(),
            Topic::RequestInput(button) => format!("REQUEST_INPUT_{}", button.wire_name()),
            Topic::ReceiveInput(button) => format!("RECEIVE_INPUT_{}", button.wire_name()),
        }
    }

    /// Parse a wire name back into a topic
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name {
            "SET_BUTTON" => Some(Topic::SetButton),
            "RENDER" => Some(Topic::Render),
            _ => {
                if let Some(button) = name.strip_prefix("REQUEST_INPUT_") {
                    LogicalButton::from_wire_name(button).map(Topic::RequestInput)
                } else if let Some(button) = name.strip_prefix("RECEIVE_INPUT_") {
                    LogicalButton::from_wire_name(button).map(Topic::ReceiveInput)
                } else {
                    None
                }
            }
        }
    }
}

/// Event crossing the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryEvent {
    /// Set the state of a button on a joypad
    SetButton {
        joypad: Joypad,
        button: LogicalButton,
        pressed: bool,
    },
    /// A rendered frame, flat RGBA in row-major order
    Render(Arc<[u8]>),
    /// Backend asks for the state of a button
    RequestInput(LogicalButton),
    /// Front end answers a `RequestInput`
    ReceiveInput { button: LogicalButton, pressed: bool },
}

impl BoundaryEvent {
    /// Topic this event is delivered on
    pub fn topic(&self) -> Topic {
        match self {
            BoundaryEvent::SetButton { .. } => Topic::SetButton,
            BoundaryEvent::Render(_) => Topic::Render,
            BoundaryEvent::RequestInput(button) => Topic::RequestInput(*button),
            BoundaryEvent::ReceiveInput { button, .. } => Topic::ReceiveInput(*button),
        }
    }
}

/// Request/response calls across the boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// "Give me the current frame now"
    CurrentFrame,
}

impl Request {
    pub const fn name(&self) -> &'static str {
        match self {
            Request::CurrentFrame => "REQUEST_FRAME",
        }
    }
}

/// Replies to [`Request`]s
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Frame(Arc<[u8]>),
}

impl Response {
    pub const fn name(&self) -> &'static str {
        match self {
            Response::Frame(_) => "FRAME",
        }
    }
}

/// Handler invoked once per matching event
pub type EventHandler = Arc<dyn Fn(&BoundaryEvent) + Send + Sync>;

/// Handler invoked once with the reply to an `invoke`
pub type ReplyHandler = Box<dyn FnOnce(Result<Response>) + Send>;

/// Backend-side service answering requests
pub type RequestService = Arc<dyn Fn(&Request) -> Result<Response> + Send + Sync>;

/// Boundary primitives provided by the host environment
pub trait Boundary: Send + Sync {
    /// Fire-and-forget, ordered
    fn emit(&self, event: BoundaryEvent);

    /// Register a handler for every event on `topic`
    fn subscribe(&self, topic: Topic, handler: EventHandler);

    /// Issue a request; `on_reply` runs on a later dispatch
    fn invoke(&self, request: Request, on_reply: ReplyHandler) -> RequestId;

    /// Drop the reply handler of an outstanding request.
    /// Returns false if the request already resolved or was never issued.
    fn cancel(&self, id: RequestId) -> bool;
}

/// Unit of work on the bus queue
enum Dispatch {
    Event(BoundaryEvent),
    Request { id: RequestId, request: Request },
    Reply { id: RequestId, result: Result<Response> },
}

struct BusInner {
    queue: Mutex<VecDeque<Dispatch>>,
    handlers: RwLock<HashMap<Topic, Vec<EventHandler>>>,
    service: RwLock<Option<RequestService>>,
    pending: Mutex<HashMap<RequestId, ReplyHandler>>,
    next_id: AtomicU64,
}

/// In-process, single-threaded cooperative event bus.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                queue: Mutex::new(VecDeque::new()),
                handlers: RwLock::new(HashMap::new()),
                service: RwLock::new(None),
                pending: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register the backend-side request service, replacing any previous one
    pub fn serve(&self, service: RequestService) {
        *self.inner.service.write() = Some(service);
        tracing::debug!("boundary request service registered");
    }

    /// Number of handlers subscribed to `topic`
    pub fn handler_count(&self, topic: Topic) -> usize {
        self.inner
            .handlers
            .read()
            .get(&topic)
            .map_or(0, |handlers| handlers.len())
    }

    /// Number of requests whose reply has not been delivered
    pub fn pending_requests(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Check if there are queued dispatches
    pub fn has_pending(&self) -> bool {
        !self.inner.queue.lock().is_empty()
    }

    /// Dispatch everything queued at the time of the call.
    ///
    /// Work queued by the handlers themselves waits for the next pump, so
    /// a reply is never delivered in the same round as its request.
    /// Returns the number of dispatches performed.
    pub fn pump(&self) -> usize {
        let batch = self.inner.queue.lock().len();
        let mut dispatched = 0;

        for _ in 0..batch {
            // Lock released before the handler runs
            let next = self.inner.queue.lock().pop_front();
            let Some(item) = next else { break };
            self.dispatch(item);
            dispatched += 1;
        }

        dispatched
    }

    /// Pump until the queue drains or [`MAX_IDLE_ROUNDS`] is reached.
    /// Returns the total number of dispatches.
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        for _ in 0..MAX_IDLE_ROUNDS {
            let dispatched = self.pump();
            if dispatched == 0 {
                return total;
            }
            total += dispatched;
        }
        tracing::warn!(total, "event bus still busy after {} rounds", MAX_IDLE_ROUNDS);
        total
    }

    fn push(&self, item: Dispatch) {
        self.inner.queue.lock().push_back(item);
    }

    fn dispatch(&self, item: Dispatch) {
        match item {
            Dispatch::Event(event) => {
                let topic = event.topic();
                let handlers = self
                    .inner
                    .handlers
                    .read()
                    .get(&topic)
                    .cloned()
                    .unwrap_or_default();

                if handlers.is_empty() {
                    tracing::trace!(topic = %topic.wire_name(), "event with no subscribers");
                }
                for handler in handlers {
                    handler(&event);
                }
            }
            Dispatch::Request { id, request } => {
                let service = self.inner.service.read().clone();
                let result = match service {
                    Some(service) => service(&request),
                    None => Err(BridgeError::NoService(request.name())),
                };
                self.push(Dispatch::Reply { id, result });
            }
            Dispatch::Reply { id, result } => {
                let handler = self.inner.pending.lock().remove(&id);
                match handler {
                    Some(on_reply) => on_reply(result),
                    None => tracing::warn!(%id, "dropping reply for cancelled request"),
                }
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Boundary for EventBus {
    fn emit(&self, event: BoundaryEvent) {
        self.push(Dispatch::Event(event));
    }

    fn subscribe(&self, topic: Topic, handler: EventHandler) {
        self.inner
            .handlers
            .write()
            .entry(topic)
            .or_default()
            .push(handler);
        tracing::debug!(topic = %topic.wire_name(), "subscribed");
    }

    fn invoke(&self, request: Request, on_reply: ReplyHandler) -> RequestId {
        let id = RequestId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.pending.lock().insert(id, on_reply);
        self.push(Dispatch::Request { id, request });
        id
    }

    fn cancel(&self, id: RequestId) -> bool {
        self.inner.pending.lock().remove(&id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(bus: &EventBus, topic: Topic) -> Arc<Mutex<Vec<BoundaryEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(topic, Arc::new(move |event| sink.lock().push(event.clone())));
        seen
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(Topic::Render.wire_name(), "RENDER");
        assert_eq!(
            Topic::RequestInput(LogicalButton::Select).wire_name(),
            "REQUEST_INPUT_SELECT"
        );
        for button in LogicalButton::ALL {
            for topic in [Topic::RequestInput(button), Topic::ReceiveInput(button)] {
                assert_eq!(Topic::from_wire_name(&topic.wire_name()), Some(topic));
            }
        }
        assert_eq!(Topic::from_wire_name("REQUEST_INPUT_TURBO"), None);
    }

    #[test]
    fn test_emit_is_deferred_and_ordered() {
        let bus = EventBus::new();
        let seen = recorder(&bus, Topic::SetButton);

        for pressed in [true, false, true] {
            bus.emit(BoundaryEvent::SetButton {
                joypad: Joypad::Primary,
                button: LogicalButton::A,
                pressed,
            });
        }
        assert!(seen.lock().is_empty());

        assert_eq!(bus.pump(), 3);
        let states: Vec<bool> = seen
            .lock()
            .iter()
            .map(|event| match event {
                BoundaryEvent::SetButton { pressed, .. } => *pressed,
                _ => panic!("Expected SetButton"),
            })
            .collect();
        assert_eq!(states, vec![true, false, true]);
    }

    #[test]
    fn test_topics_are_isolated() {
        let bus = EventBus::new();
        let up = recorder(&bus, Topic::RequestInput(LogicalButton::Up));
        let down = recorder(&bus, Topic::RequestInput(LogicalButton::Down));

        bus.emit(BoundaryEvent::RequestInput(LogicalButton::Down));
        bus.run_until_idle();

        assert!(up.lock().is_empty());
        assert_eq!(down.lock().len(), 1);
    }

    #[test]
    fn test_reply_arrives_on_later_dispatch() {
        let bus = EventBus::new();
        bus.serve(Arc::new(|_request| Ok(Response::Frame(Arc::from(vec![1u8, 2, 3, 4])))));

        let reply = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&reply);
        bus.invoke(
            Request::CurrentFrame,
            Box::new(move |result| *slot.lock() = Some(result.is_ok())),
        );
        assert_eq!(bus.pending_requests(), 1);

        // First round runs the service, second delivers the reply
        assert_eq!(bus.pump(), 1);
        assert!(reply.lock().is_none());
        assert_eq!(bus.pump(), 1);
        assert_eq!(*reply.lock(), Some(true));
        assert_eq!(bus.pending_requests(), 0);
    }

    #[test]
    fn test_invoke_without_service() {
        let bus = EventBus::new();
        let reply = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&reply);
        bus.invoke(
            Request::CurrentFrame,
            Box::new(move |result| *slot.lock() = Some(result)),
        );
        bus.run_until_idle();

        let result = reply.lock().take().expect("reply delivered");
        assert!(matches!(result, Err(BridgeError::NoService("REQUEST_FRAME"))));
    }

    #[test]
    fn test_cancel_drops_reply() {
        let bus = EventBus::new();
        bus.serve(Arc::new(|_request| Ok(Response::Frame(Arc::from(Vec::new())))));

        let called = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&called);
        let id = bus.invoke(Request::CurrentFrame, Box::new(move |_| *flag.lock() = true));

        assert!(bus.cancel(id));
        assert!(!bus.cancel(id));
        bus.run_until_idle();
        assert!(!*called.lock());
    }

    #[test]
    fn test_handler_may_emit_during_dispatch() {
        let bus = EventBus::new();
        let echo = bus.clone();
        bus.subscribe(
            Topic::RequestInput(LogicalButton::B),
            Arc::new(move |_| {
                echo.emit(BoundaryEvent::ReceiveInput {
                    button: LogicalButton::B,
                    pressed: false,
                })
            }),
        );
        let replies = recorder(&bus, Topic::ReceiveInput(LogicalButton::B));

        bus.emit(BoundaryEvent::RequestInput(LogicalButton::B));
        assert_eq!(bus.pump(), 1);
        assert!(replies.lock().is_empty());
        assert_eq!(bus.pump(), 1);
        assert_eq!(replies.lock().len(), 1);
    }
}
