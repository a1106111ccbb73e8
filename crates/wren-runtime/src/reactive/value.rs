#![forbid(unsafe_code)]

//! Single observable value with equality-based change suppression.
//!
//! # Design
//!
//! [`ObservableValue<T>`] wraps a value in shared storage
//! (`Rc<RefCell<..>>`). A write that leaves the value equal to what was
//! stored (by `PartialEq`) is dropped silently; any other write bumps the
//! version and notifies every subscriber in registration order.
//!
//! Arithmetic and comparison are explicit: read with [`get`] or [`with`],
//! compare with `==`/`<` against a plain `T`, and express in-place operators
//! as [`update`] so that change suppression still applies.
//!
//! [`get`]: ObservableValue::get
//! [`with`]: ObservableValue::with
//! [`update`]: ObservableValue::update
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: allowed. The borrow is released before subscribers
//!   run, so a subscriber may write the value again; that write notifies
//!   (recursively) before the outer notification continues.
//! - **Value equality**: suppression compares by value. Types whose
//!   `PartialEq` is identity-based get identity suppression.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use super::observable::{
    Callback, HasSubscribers, Observable, Subscribers, Subscription, attach, fan_out,
};

struct ValueInner<T> {
    value: T,
    version: u64,
    subscribers: Subscribers<T>,
}

impl<T> HasSubscribers for ValueInner<T> {
    type Value = T;

    fn subscribers_mut(&mut self) -> &mut Subscribers<T> {
        &mut self.subscribers
    }
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `ObservableValue` creates a new handle to the **same** inner
/// state: both handles see the same value and share subscribers.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write.
/// 2. `set(v)` where `v == current` is a no-op.
/// 3. Subscribers are notified in registration order with the new value.
pub struct ObservableValue<T> {
    inner: Rc<RefCell<ValueInner<T>>>,
}

impl<T> Clone for ObservableValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableValue")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for ObservableValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.borrow().value.fmt(f)
    }
}

impl<T: Clone + PartialEq + 'static> ObservableValue<T> {
    /// Create a new observable with the given initial value.
    ///
    /// The initial version is 0 and no subscribers are registered.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ValueInner {
                value,
                version: 0,
                subscribers: Subscribers::default(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Store `value` and notify, unless it equals the current value.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Store `value` and return the previous one. Notifies only if they differ.
    pub fn replace(&self, value: T) -> T {
        let previous = {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return value;
            }
            inner.version += 1;
            std::mem::replace(&mut inner.value, value)
        };
        self.notify();
        previous
    }

    /// Modify the value in place. If the result differs from the value
    /// before `f` ran, the version is bumped and subscribers notified.
    ///
    /// `counter.update(|n| *n += 5)` is the in-place add. `f` edits a copy
    /// with no borrow held, so it may read this value (`x += x`).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Value comparison without cloning.
    #[must_use]
    pub fn equals(&self, other: &T) -> bool {
        self.inner.borrow().value == *other
    }
}

impl<T: Clone + PartialEq + 'static> Observable for ObservableValue<T> {
    type Value = T;

    fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        attach(&self.inner, Rc::new(callback))
    }

    fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    fn notify(&self) {
        let (callbacks, value): (Vec<Callback<T>>, T) = {
            let inner = self.inner.borrow();
            (inner.subscribers.snapshot(), inner.value.clone())
        };
        fan_out(&callbacks, &value);
    }
}

impl<T: PartialEq> PartialEq<T> for ObservableValue<T> {
    fn eq(&self, other: &T) -> bool {
        self.inner.borrow().value == *other
    }
}

impl<T: PartialOrd> PartialOrd<T> for ObservableValue<T> {
    fn partial_cmp(&self, other: &T) -> Option<Ordering> {
        self.inner.borrow().value.partial_cmp(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_set_basic() {
        let obs = ObservableValue::new(42);
        assert_eq!(obs.get(), 42);
        assert_eq!(obs.version(), 0);

        obs.set(99);
        assert_eq!(obs.get(), 99);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn no_change_no_version_bump() {
        let obs = ObservableValue::new(42);
        obs.set(42);
        assert_eq!(obs.version(), 0);
    }

    #[test]
    fn with_access() {
        let obs = ObservableValue::new(vec![1, 2, 3]);
        let sum = obs.with(|v| v.iter().sum::<i32>());
        assert_eq!(sum, 6);
    }

    #[test]
    fn update_is_in_place_arithmetic() {
        let obs = ObservableValue::new(10);
        obs.update(|n| *n += 5);
        assert_eq!(obs.get(), 15);
        obs.update(|n| *n *= 2);
        assert_eq!(obs.get(), 30);
        assert_eq!(obs.version(), 2);
    }

    #[test]
    fn update_no_change_no_bump() {
        let obs = ObservableValue::new(10);
        let hits = Rc::new(Cell::new(0u32));
        let hits_clone = Rc::clone(&hits);
        let _sub = obs.subscribe(move |_: &i32| hits_clone.set(hits_clone.get() + 1));

        obs.update(|n| *n += 0);
        assert_eq!(obs.version(), 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn replace_returns_previous() {
        let obs = ObservableValue::new("a".to_string());
        assert_eq!(obs.replace("b".to_string()), "a");
        assert_eq!(obs.replace("b".to_string()), "b");
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn change_notification() {
        let obs = ObservableValue::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);

        let _sub = obs.subscribe(move |_: &i32| {
            count_clone.set(count_clone.get() + 1);
        });

        obs.set(1);
        assert_eq!(count.get(), 1);

        obs.set(2);
        assert_eq!(count.get(), 2);

        // Same value, no notification.
        obs.set(2);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn subscriber_receives_new_value() {
        let obs = ObservableValue::new(0);
        let last_seen = Rc::new(Cell::new(0));
        let last_clone = Rc::clone(&last_seen);

        let _sub = obs.subscribe(move |val: &i32| last_clone.set(*val));

        obs.set(42);
        assert_eq!(last_seen.get(), 42);
    }

    #[test]
    fn subscription_drop_unsubscribes() {
        let obs = ObservableValue::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);

        let sub = obs.subscribe(move |_: &i32| count_clone.set(count_clone.get() + 1));
        obs.set(1);
        drop(sub);
        obs.set(2);

        assert_eq!(count.get(), 1);
        assert_eq!(obs.subscriber_count(), 0);
    }

    #[test]
    fn detached_subscription_survives() {
        let obs = ObservableValue::new(0);
        let count = Rc::new(Cell::new(0u32));
        let count_clone = Rc::clone(&count);

        obs.subscribe(move |_: &i32| count_clone.set(count_clone.get() + 1))
            .detach();
        obs.set(1);
        obs.set(2);

        assert_eq!(count.get(), 2);
        assert_eq!(obs.subscriber_count(), 1);
    }

    #[test]
    fn notification_order_is_registration_order() {
        let obs = ObservableValue::new(0);
        let log = Rc::new(RefCell::new(Vec::new()));

        let log1 = Rc::clone(&log);
        let _s1 = obs.subscribe(move |_: &i32| log1.borrow_mut().push('A'));
        let log2 = Rc::clone(&log);
        let _s2 = obs.subscribe(move |_: &i32| log2.borrow_mut().push('B'));
        let log3 = Rc::clone(&log);
        let _s3 = obs.subscribe(move |_: &i32| log3.borrow_mut().push('C'));

        obs.set(1);
        assert_eq!(*log.borrow(), vec!['A', 'B', 'C']);
    }

    #[test]
    fn reentrant_set_from_subscriber() {
        let obs = ObservableValue::new(0);
        let handle = obs.clone();
        let _sub = obs.subscribe(move |v: &i32| {
            if *v < 3 {
                handle.set(v + 1);
            }
        });

        obs.set(1);
        assert_eq!(obs.get(), 3);
        assert_eq!(obs.version(), 3);
    }

    #[test]
    fn subscriber_may_unsubscribe_itself_mid_notify() {
        let obs = ObservableValue::new(0);
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let slot_clone = Rc::clone(&slot);
        let hits = Rc::new(Cell::new(0u32));
        let hits_clone = Rc::clone(&hits);

        let sub = obs.subscribe(move |_: &i32| {
            hits_clone.set(hits_clone.get() + 1);
            slot_clone.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);

        obs.set(1);
        obs.set(2);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn clone_shares_state() {
        let obs1 = ObservableValue::new(0);
        let obs2 = obs1.clone();

        obs1.set(42);
        assert_eq!(obs2.get(), 42);
        assert_eq!(obs2.version(), 1);
    }

    #[test]
    fn read_through_comparisons() {
        let obs = ObservableValue::new(5);
        assert!(obs == 5);
        assert!(obs < 6);
        assert!(obs > 4);
        assert!(obs.equals(&5));
        assert!(!obs.equals(&6));
    }

    #[test]
    fn explicit_notify_fires_without_change() {
        let obs = ObservableValue::new(7);
        let seen = Rc::new(Cell::new(0));
        let seen_clone = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v: &i32| seen_clone.set(*v));

        obs.notify();
        assert_eq!(seen.get(), 7);
        assert_eq!(obs.version(), 0);
    }

    #[test]
    fn display_and_debug() {
        let obs = ObservableValue::new(42);
        assert_eq!(obs.to_string(), "42");
        let dbg = format!("{obs:?}");
        assert!(dbg.contains("ObservableValue"));
        assert!(dbg.contains("version"));
    }

    #[test]
    fn string_observable() {
        let obs = ObservableValue::new(String::new());
        let changes = Rc::new(Cell::new(0u32));
        let changes_clone = Rc::clone(&changes);

        let _sub = obs.subscribe(move |_: &String| changes_clone.set(changes_clone.get() + 1));

        obs.set("hello".to_string());
        obs.set("hello".to_string());
        obs.set("world".to_string());

        assert_eq!(changes.get(), 2);
        assert_eq!(obs.version(), 2);
    }

    #[test]
    fn update_may_read_itself() {
        let obs = ObservableValue::new(4);
        let handle = obs.clone();
        let seen = Rc::new(Cell::new(0));
        let seen_clone = Rc::clone(&seen);
        let _sub = obs.subscribe(move |v: &i32| seen_clone.set(*v));

        obs.update(|n| *n += handle.get());

        assert_eq!(obs.get(), 8);
        assert_eq!(seen.get(), 8);
        assert_eq!(obs.version(), 1);
    }
}
