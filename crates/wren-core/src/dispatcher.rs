//! Name-keyed listener registry with isolated fan-out.
//!
//! # Design
//!
//! [`EventDispatcher`] is a shared handle (`Rc<RefCell<..>>`); cloning it
//! yields another handle to the **same** registry, which is how several
//! contexts share one dispatcher. Each event name maps to an ordered set of
//! [`Listener`]s. Membership is by handle identity: registering the same
//! handle twice keeps a single entry.
//!
//! # Invariants
//!
//! 1. A name is present in the registry iff it has at least one listener.
//! 2. Every listener registered for a name is called exactly once per
//!    `dispatch`, in registration order.
//! 3. A failing listener (an `Err` return, or a panic when
//!    [`DispatcherConfig::isolate_panics`] is set) is logged and skipped;
//!    the remaining listeners still run and `dispatch` still returns.
//! 4. The registry borrow is released before any listener runs, so listeners
//!    may add or remove listeners and dispatch further events re-entrantly.
//!    Changes made during a dispatch take effect from the next dispatch.
//!
//! # Failure Modes
//!
//! - **Dispatch to nobody**: not an error. Reported at the severity chosen by
//!   [`UnhandledPolicy`] (warning by default).
//! - **Unbounded recursion**: a listener that dispatches the event it is
//!   handling recurses without a guard. Avoiding that is the caller's job.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use tracing::{debug, error, trace, warn};

use crate::error::{Result, require_non_blank};
use crate::event::Event;

type ListenerFn = dyn Fn(&Event) -> anyhow::Result<()>;

/// A registered event callback.
///
/// Cloning a `Listener` clones the handle, not the closure; clones compare
/// equal and refer to the same registry entry.
#[derive(Clone)]
pub struct Listener(Rc<ListenerFn>);

impl Listener {
    pub fn new(callback: impl Fn(&Event) -> anyhow::Result<()> + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invoke the callback directly, outside any dispatcher.
    pub fn call(&self, event: &Event) -> anyhow::Result<()> {
        (self.0)(event)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// Severity used when an event is dispatched with no listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnhandledPolicy {
    #[default]
    Warn,
    Debug,
    Silent,
}

/// Configuration for [`EventDispatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Catch listener panics and treat them like `Err` returns.
    pub isolate_panics: bool,
    /// How dispatch-to-nobody is reported.
    pub unhandled: UnhandledPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            isolate_panics: true,
            unhandled: UnhandledPolicy::Warn,
        }
    }
}

impl DispatcherConfig {
    #[must_use]
    pub fn with_isolate_panics(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }

    #[must_use]
    pub fn with_unhandled(mut self, policy: UnhandledPolicy) -> Self {
        self.unhandled = policy;
        self
    }
}

/// Outcome of one [`EventDispatcher::dispatch`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Listeners that returned `Ok`.
    pub delivered: usize,
    /// Listeners that returned `Err` or panicked.
    pub failed: usize,
}

impl DispatchReport {
    /// True when no listener was registered for the event.
    #[must_use]
    pub fn is_unhandled(&self) -> bool {
        self.delivered == 0 && self.failed == 0
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.delivered + self.failed
    }
}

struct DispatcherInner {
    listeners: HashMap<String, Vec<Listener>>,
    config: DispatcherConfig,
}

/// Shared registry routing named events to listeners.
#[derive(Clone)]
pub struct EventDispatcher {
    inner: Rc<RefCell<DispatcherInner>>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let mut names: Vec<(&str, usize)> = inner
            .listeners
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        names.sort_unstable();
        f.debug_struct("EventDispatcher")
            .field("listeners", &names)
            .field("config", &inner.config)
            .finish()
    }
}

impl EventDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DispatcherConfig::default())
    }

    #[must_use]
    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DispatcherInner {
                listeners: HashMap::new(),
                config,
            })),
        }
    }

    #[must_use]
    pub fn config(&self) -> DispatcherConfig {
        self.inner.borrow().config
    }

    /// Register `listener` for `event_name`. Re-registering the same handle
    /// is a no-op.
    pub fn add_listener(&self, event_name: &str, listener: &Listener) -> Result<()> {
        require_non_blank("event_name", event_name)?;
        let mut inner = self.inner.borrow_mut();
        let entry = inner.listeners.entry(event_name.to_string()).or_default();
        if entry.contains(listener) {
            trace!(event = event_name, "listener already registered");
            return Ok(());
        }
        entry.push(listener.clone());
        debug!(event = event_name, count = entry.len(), "listener added");
        Ok(())
    }

    /// Unregister `listener` from `event_name`.
    ///
    /// Unknown names and unregistered listeners are silently ignored. Removing
    /// the last listener for a name drops the name from the registry.
    pub fn remove_listener(&self, event_name: &str, listener: &Listener) -> Result<()> {
        require_non_blank("event_name", event_name)?;
        let mut inner = self.inner.borrow_mut();
        let Some(entry) = inner.listeners.get_mut(event_name) else {
            return Ok(());
        };
        entry.retain(|l| l != listener);
        if entry.is_empty() {
            inner.listeners.remove(event_name);
            debug!(event = event_name, "last listener removed");
        }
        Ok(())
    }

    /// Call every listener registered for `event.name()`.
    ///
    /// Listener failures never propagate; see the module docs.
    pub fn dispatch(&self, event: &Event) -> DispatchReport {
        let name = event.name();
        let (listeners, config) = {
            let inner = self.inner.borrow();
            (inner.listeners.get(name).cloned(), inner.config)
        };

        let Some(listeners) = listeners else {
            match config.unhandled {
                UnhandledPolicy::Warn => {
                    warn!(event = name, "event was dispatched but has no listeners");
                }
                UnhandledPolicy::Debug => {
                    debug!(event = name, "event was dispatched but has no listeners");
                }
                UnhandledPolicy::Silent => {}
            }
            return DispatchReport::default();
        };

        let mut report = DispatchReport::default();
        for listener in &listeners {
            if invoke(listener, event, config.isolate_panics) {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        trace!(
            event = name,
            delivered = report.delivered,
            failed = report.failed,
            "dispatch complete"
        );
        report
    }

    #[must_use]
    pub fn listener_count(&self, event_name: &str) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(event_name)
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn has_listeners(&self, event_name: &str) -> bool {
        self.inner.borrow().listeners.contains_key(event_name)
    }

    /// Registered event names, sorted.
    #[must_use]
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.borrow().listeners.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.inner.borrow_mut().listeners.clear();
    }
}

/// Run one listener, logging any failure. Returns `true` on success.
fn invoke(listener: &Listener, event: &Event, isolate_panics: bool) -> bool {
    let name = event.name();
    let result = if isolate_panics {
        match catch_unwind(AssertUnwindSafe(|| listener.call(event))) {
            Ok(result) => result,
            Err(panic) => {
                error!(
                    event = name,
                    panic = panic_message(panic.as_ref()),
                    "listener panicked"
                );
                return false;
            }
        }
    } else {
        listener.call(event)
    };

    match result {
        Ok(()) => true,
        Err(err) => {
            error!(event = name, error = %format!("{err:#}"), "error in event listener");
            false
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use std::cell::Cell;

    fn counting(counter: &Rc<Cell<u32>>) -> Listener {
        let counter = Rc::clone(counter);
        Listener::new(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        })
    }

    fn event(name: &str) -> Event {
        Event::new(name).unwrap()
    }

    #[test]
    fn add_and_dispatch() {
        let dispatcher = EventDispatcher::new();
        let hits = Rc::new(Cell::new(0));
        dispatcher.add_listener("ping", &counting(&hits)).unwrap();

        let report = dispatcher.dispatch(&event("ping"));
        assert_eq!(hits.get(), 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn listener_receives_event() {
        let dispatcher = EventDispatcher::new();
        let seen = Rc::new(RefCell::new(None));
        let seen_clone = Rc::clone(&seen);
        let listener = Listener::new(move |e| {
            *seen_clone.borrow_mut() = Some(e.clone());
            Ok(())
        });
        dispatcher.add_listener("ping", &listener).unwrap();

        let sent = Event::with_payload("ping", serde_json::json!({"n": 1})).unwrap();
        dispatcher.dispatch(&sent);
        assert_eq!(seen.borrow().as_ref(), Some(&sent));
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let dispatcher = EventDispatcher::new();
        let hits = Rc::new(Cell::new(0));
        let listener = counting(&hits);
        dispatcher.add_listener("ping", &listener).unwrap();
        dispatcher.add_listener("ping", &listener.clone()).unwrap();
        assert_eq!(dispatcher.listener_count("ping"), 1);

        dispatcher.dispatch(&event("ping"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn distinct_closures_are_distinct_listeners() {
        let dispatcher = EventDispatcher::new();
        let hits = Rc::new(Cell::new(0));
        dispatcher.add_listener("ping", &counting(&hits)).unwrap();
        dispatcher.add_listener("ping", &counting(&hits)).unwrap();
        dispatcher.dispatch(&event("ping"));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn blank_names_rejected() {
        let dispatcher = EventDispatcher::new();
        let listener = Listener::new(|_| Ok(()));
        for name in ["", "   "] {
            let err = dispatcher.add_listener(name, &listener).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument);
            let err = dispatcher.remove_listener(name, &listener).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument);
        }
        assert!(dispatcher.event_names().is_empty());
    }

    #[test]
    fn remove_unknown_is_noop() {
        let dispatcher = EventDispatcher::new();
        let listener = Listener::new(|_| Ok(()));
        dispatcher.remove_listener("nobody", &listener).unwrap();

        let other = Listener::new(|_| Ok(()));
        dispatcher.add_listener("ping", &other).unwrap();
        dispatcher.remove_listener("ping", &listener).unwrap();
        assert_eq!(dispatcher.listener_count("ping"), 1);
    }

    #[test]
    fn removing_last_listener_drops_name() {
        let dispatcher = EventDispatcher::new();
        let a = Listener::new(|_| Ok(()));
        let b = Listener::new(|_| Ok(()));
        dispatcher.add_listener("ping", &a).unwrap();
        dispatcher.add_listener("ping", &b).unwrap();

        dispatcher.remove_listener("ping", &a).unwrap();
        assert!(dispatcher.has_listeners("ping"));
        dispatcher.remove_listener("ping", &b).unwrap();
        assert!(!dispatcher.has_listeners("ping"));
        assert!(dispatcher.event_names().is_empty());
        assert!(dispatcher.dispatch(&event("ping")).is_unhandled());
    }

    #[test]
    fn dispatch_without_listeners_is_ok() {
        let dispatcher = EventDispatcher::new();
        let report = dispatcher.dispatch(&event("nobody"));
        assert!(report.is_unhandled());
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn failing_listener_is_isolated() {
        let dispatcher = EventDispatcher::new();
        let hits = Rc::new(Cell::new(0));
        dispatcher
            .add_listener("ping", &Listener::new(|_| Err(anyhow::anyhow!("boom"))))
            .unwrap();
        dispatcher.add_listener("ping", &counting(&hits)).unwrap();

        let report = dispatcher.dispatch(&event("ping"));
        assert_eq!(hits.get(), 1);
        assert_eq!(report, DispatchReport { delivered: 1, failed: 1 });
    }

    #[test]
    fn panicking_listener_is_isolated() {
        let dispatcher = EventDispatcher::new();
        let hits = Rc::new(Cell::new(0));
        dispatcher
            .add_listener("ping", &Listener::new(|_| panic!("listener bug")))
            .unwrap();
        dispatcher.add_listener("ping", &counting(&hits)).unwrap();

        let report = dispatcher.dispatch(&event("ping"));
        assert_eq!(hits.get(), 1);
        assert_eq!(report.failed, 1);

        // The dispatcher is still usable afterwards.
        let report = dispatcher.dispatch(&event("ping"));
        assert_eq!(hits.get(), 2);
        assert_eq!(report.delivered, 1);
    }

    #[test]
    #[should_panic(expected = "listener bug")]
    fn panics_propagate_when_isolation_disabled() {
        let dispatcher =
            EventDispatcher::with_config(DispatcherConfig::default().with_isolate_panics(false));
        dispatcher
            .add_listener("ping", &Listener::new(|_| panic!("listener bug")))
            .unwrap();
        dispatcher.dispatch(&event("ping"));
    }

    #[test]
    fn registration_order_is_call_order() {
        let dispatcher = EventDispatcher::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in ['A', 'B', 'C'] {
            let log = Rc::clone(&log);
            let listener = Listener::new(move |_| {
                log.borrow_mut().push(tag);
                Ok(())
            });
            dispatcher.add_listener("ping", &listener).unwrap();
        }
        dispatcher.dispatch(&event("ping"));
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn clones_share_registry() {
        let a = EventDispatcher::new();
        let b = a.clone();
        let hits = Rc::new(Cell::new(0));
        a.add_listener("ping", &counting(&hits)).unwrap();
        b.dispatch(&event("ping"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn reentrant_dispatch() {
        let dispatcher = EventDispatcher::new();
        let hits = Rc::new(Cell::new(0));
        dispatcher.add_listener("second", &counting(&hits)).unwrap();

        let inner = dispatcher.clone();
        let forward = Listener::new(move |_| {
            inner.dispatch(&Event::new("second")?);
            Ok(())
        });
        dispatcher.add_listener("first", &forward).unwrap();

        dispatcher.dispatch(&event("first"));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let dispatcher = EventDispatcher::new();
        let hits = Rc::new(Cell::new(0));
        let slot: Rc<RefCell<Option<Listener>>> = Rc::new(RefCell::new(None));

        let handle = dispatcher.clone();
        let slot_clone = Rc::clone(&slot);
        let hits_clone = Rc::clone(&hits);
        let once = Listener::new(move |e| {
            hits_clone.set(hits_clone.get() + 1);
            if let Some(me) = slot_clone.borrow().as_ref() {
                handle.remove_listener(e.name(), me)?;
            }
            Ok(())
        });
        *slot.borrow_mut() = Some(once.clone());
        dispatcher.add_listener("ping", &once).unwrap();

        dispatcher.dispatch(&event("ping"));
        dispatcher.dispatch(&event("ping"));
        assert_eq!(hits.get(), 1);
        assert!(!dispatcher.has_listeners("ping"));
    }

    #[test]
    fn clear_drops_everything() {
        let dispatcher = EventDispatcher::new();
        dispatcher
            .add_listener("a", &Listener::new(|_| Ok(())))
            .unwrap();
        dispatcher
            .add_listener("b", &Listener::new(|_| Ok(())))
            .unwrap();
        assert_eq!(dispatcher.event_names(), vec!["a".to_string(), "b".to_string()]);
        dispatcher.clear();
        assert!(dispatcher.event_names().is_empty());
    }

    #[test]
    fn config_builders() {
        let config = DispatcherConfig::default()
            .with_isolate_panics(false)
            .with_unhandled(UnhandledPolicy::Silent);
        assert!(!config.isolate_panics);
        assert_eq!(config.unhandled, UnhandledPolicy::Silent);
        assert_eq!(EventDispatcher::with_config(config).config(), config);
    }

    #[test]
    fn debug_lists_names() {
        let dispatcher = EventDispatcher::new();
        dispatcher
            .add_listener("ping", &Listener::new(|_| Ok(())))
            .unwrap();
        let dbg = format!("{dispatcher:?}");
        assert!(dbg.contains("EventDispatcher"));
        assert!(dbg.contains("ping"));
    }
}
