#![forbid(unsafe_code)]

//! The notification protocol shared by observable containers.
//!
//! # Design
//!
//! Each container owns a subscriber chain: callbacks keyed by a
//! monotonically increasing id, kept in registration order. Registering a
//! callback returns a [`Subscription`] that removes the entry when dropped.
//!
//! # Performance
//!
//! | Operation       | Complexity                 |
//! |-----------------|----------------------------|
//! | `subscribe()`   | O(1) amortized             |
//! | unsubscribe     | O(S) where S = subscribers |
//! | notify          | O(S) + one value clone     |
//!
//! # Failure Modes
//!
//! - **Panicking subscriber**: propagates to whoever triggered the change.
//!   Subscribers registered after it are not called for that change.
//! - **Detached subscriber**: lives as long as the container. Detach only
//!   callbacks that are meant to last as long as the model.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A subscriber callback.
pub(crate) type Callback<T> = Rc<dyn Fn(&T)>;

/// Common surface of observable containers.
pub trait Observable {
    /// The value handed to subscribers.
    type Value: 'static;

    /// Borrow the current value.
    fn with<R>(&self, f: impl FnOnce(&Self::Value) -> R) -> R;

    /// Register `callback`; it runs after every notification until the returned
    /// guard is dropped.
    fn subscribe(&self, callback: impl Fn(&Self::Value) + 'static) -> Subscription;

    /// Number of registered callbacks.
    fn subscriber_count(&self) -> usize;

    /// Increments once per state change.
    fn version(&self) -> u64;

    /// Notify every subscriber with the current value, unconditionally.
    fn notify(&self);
}

/// Ordered callback chain.
pub(crate) struct Subscribers<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Subscribers<T> {
    pub(crate) fn insert(&mut self, callback: Callback<T>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    pub(crate) fn snapshot(&self) -> Vec<Callback<T>> {
        self.entries.iter().map(|(_, cb)| Rc::clone(cb)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Container state that owns a subscriber chain.
pub(crate) trait HasSubscribers {
    type Value;
    fn subscribers_mut(&mut self) -> &mut Subscribers<Self::Value>;
}

/// Register `callback` on the chain inside `inner` and build the guard that
/// removes it again.
pub(crate) fn attach<I>(inner: &Rc<RefCell<I>>, callback: Callback<I::Value>) -> Subscription
where
    I: HasSubscribers + 'static,
{
    let id = inner.borrow_mut().subscribers_mut().insert(callback);
    let weak: Weak<RefCell<I>> = Rc::downgrade(inner);
    Subscription::new(move || {
        if let Some(inner) = weak.upgrade() {
            inner.borrow_mut().subscribers_mut().remove(id);
        }
    })
}

/// Call each callback in order with `value`.
pub(crate) fn fan_out<T>(callbacks: &[Callback<T>], value: &T) {
    for cb in callbacks {
        cb(value);
    }
}

/// Guard for a registered callback.
///
/// Dropping the `Subscription` unregisters the callback. [`detach`] keeps
/// the callback registered for the container's lifetime instead.
///
/// [`detach`]: Subscription::detach
#[must_use = "dropping a Subscription unregisters its callback; call `detach()` to keep it"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Keep the callback registered after this guard goes away.
    pub fn detach(mut self) {
        self.unsubscribe.take();
    }

    /// Unregister now. Same as dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}
