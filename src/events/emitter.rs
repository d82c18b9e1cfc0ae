//! Named-event emitter used as the notification sink.
//!
//! # Responsibilities
//! - Register listeners per event name (`on`, `once`)
//! - Deliver events immediately (`emit`) or on an attached execution
//!   context (`schedule_future_emit`)
//!
//! # Design Decisions
//! - Listeners are invoked without any internal lock held, so a listener may
//!   register or remove listeners itself
//! - Scheduled events travel through one unbounded channel drained by a
//!   single task, which preserves emission order
//! - Without an attached context, scheduled events are delivered
//!   synchronously

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub name: String,
    pub arguments: Vec<Value>,
}

impl Event {
    pub fn new(name: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Callback invoked for each matching event.
pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned on registration, used to remove a listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    callback: Listener,
    once: bool,
}

/// Event emitter with optional deferred delivery.
#[derive(Default)]
pub struct EventEmitter {
    listeners: DashMap<String, Vec<Registration>>,
    next_id: AtomicU64,
    context: ArcSwapOption<mpsc::UnboundedSender<Event>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen to every `event`.
    pub fn on<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.add(event.into(), Arc::new(listener), false)
    }

    /// Listen to the next `event` only.
    pub fn once<F>(&self, event: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.add(event.into(), Arc::new(listener), true)
    }

    fn add(&self, event: String, callback: Listener, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .entry(event)
            .or_default()
            .push(Registration { id, callback, once });
        id
    }

    /// Remove one listener. Returns false if it was not registered.
    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let Some(mut registrations) = self.listeners.get_mut(event) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        let removed = registrations.len() != before;
        let now_empty = registrations.is_empty();
        drop(registrations);

        if now_empty {
            self.listeners.remove_if(event, |_, regs| regs.is_empty());
        }
        removed
    }

    /// Remove every listener of `event`, or of all events when `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        match event {
            Some(event) => {
                self.listeners.remove(event);
            }
            None => self.listeners.clear(),
        }
    }

    /// Listeners currently registered for `event`, in registration order.
    pub fn listeners(&self, event: &str) -> Vec<ListenerId> {
        self.listeners
            .get(event)
            .map(|regs| regs.iter().map(|r| r.id).collect())
            .unwrap_or_default()
    }

    /// Deliver `event` to its listeners now. Returns the number invoked.
    pub fn emit(&self, event: impl Into<String>, arguments: Vec<Value>) -> usize {
        self.dispatch(&Event::new(event, arguments))
    }

    fn dispatch(&self, event: &Event) -> usize {
        let callbacks: Vec<Listener> = match self.listeners.get_mut(&event.name) {
            Some(mut registrations) => {
                let callbacks = registrations.iter().map(|r| Arc::clone(&r.callback)).collect();
                registrations.retain(|r| !r.once);
                callbacks
            }
            None => return 0,
        };

        tracing::trace!(event = %event.name, listeners = callbacks.len(), "Emitting event");
        for callback in &callbacks {
            callback(event);
        }
        callbacks.len()
    }

    /// Deliver `event` on the attached execution context, or synchronously
    /// if none is attached.
    pub fn schedule_future_emit(&self, event: impl Into<String>, arguments: Vec<Value>) {
        let event = Event::new(event, arguments);
        let context = self.context.load();
        let pending = match &*context {
            Some(sender) => match sender.send(event) {
                Ok(()) => return,
                Err(mpsc::error::SendError(event)) => {
                    tracing::warn!(event = %event.name, "Event context gone, emitting synchronously");
                    event
                }
            },
            None => event,
        };
        drop(context);
        self.dispatch(&pending);
    }

    /// Attach an execution context: scheduled events are delivered in order
    /// by a task spawned on `handle`. Replaces any previous context.
    pub fn attach(self: &Arc<Self>, handle: &Handle) -> JoinHandle<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let emitter: Weak<Self> = Arc::downgrade(self);
        self.context.store(Some(Arc::new(tx)));

        handle.spawn(async move {
            while let Some(event) = rx.recv().await {
                let Some(emitter) = emitter.upgrade() else {
                    break;
                };
                emitter.dispatch(&event);
            }
            tracing::debug!("Event context drained");
        })
    }

    /// Detach the execution context. Already scheduled events are still
    /// delivered by the draining task.
    pub fn detach(&self) {
        self.context.store(None);
    }

    pub fn has_context(&self) -> bool {
        self.context.load().is_some()
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("events", &self.listeners.len())
            .field("has_context", &self.has_context())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[test]
    fn test_on_and_emit() {
        let emitter = EventEmitter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        emitter.on("doc.saved", move |event| {
            sink.lock().unwrap().push(event.arguments.clone());
        });

        assert_eq!(emitter.emit("doc.saved", vec![json!("a")]), 1);
        assert_eq!(emitter.emit("doc.saved", vec![json!("b")]), 1);
        assert_eq!(emitter.emit("other", vec![]), 0);
        assert_eq!(*seen.lock().unwrap(), vec![vec![json!("a")], vec![json!("b")]]);
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        emitter.once("tick", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        emitter.emit("tick", vec![]);
        emitter.emit("tick", vec![]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(emitter.listeners("tick").is_empty());
    }

    #[test]
    fn test_remove_listeners() {
        let emitter = EventEmitter::new();
        let a = emitter.on("e", |_| {});
        let b = emitter.on("e", |_| {});
        emitter.on("f", |_| {});
        assert_eq!(emitter.listeners("e"), vec![a, b]);

        assert!(emitter.remove_listener("e", a));
        assert!(!emitter.remove_listener("e", a));
        assert_eq!(emitter.listeners("e"), vec![b]);

        emitter.remove_all_listeners(Some("e"));
        assert!(emitter.listeners("e").is_empty());
        assert_eq!(emitter.listeners("f").len(), 1);

        emitter.remove_all_listeners(None);
        assert!(emitter.listeners("f").is_empty());
    }

    #[test]
    fn test_listener_may_register_listeners() {
        let emitter = Arc::new(EventEmitter::new());
        let inner = Arc::clone(&emitter);
        emitter.on("outer", move |_| {
            inner.on("late", |_| {});
        });
        emitter.emit("outer", vec![]);
        assert_eq!(emitter.listeners("late").len(), 1);
    }

    #[test]
    fn test_future_emit_without_context_is_synchronous() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        emitter.on("e", move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        emitter.schedule_future_emit("e", vec![]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_future_emit_with_context_preserves_order() {
        let emitter = Arc::new(EventEmitter::new());
        emitter.attach(&Handle::current());
        assert!(emitter.has_context());

        let (tx, mut rx) = mpsc::unbounded_channel();
        emitter.on("e", move |event| {
            let _ = tx.send(event.arguments[0].clone());
        });

        for i in 0..3 {
            emitter.schedule_future_emit("e", vec![json!(i)]);
        }
        // Nothing is delivered until the context task gets to run
        assert!(rx.try_recv().is_err());

        for i in 0..3 {
            assert_eq!(rx.recv().await, Some(json!(i)));
        }
    }
}
