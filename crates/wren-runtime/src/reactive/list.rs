#![forbid(unsafe_code)]

//! Ordered observable collection with batched notification.
//!
//! Every structural mutation notifies subscribers with the whole resulting
//! sequence. Between [`ObservableList::begin_batch_update`] and
//! [`ObservableList::end_batch_update`] notifications are held back and
//! coalesced: the end of the batch fires one notification if, and only if,
//! something was mutated inside it.
//!
//! Batching is a single flag per list. Nested batches do not compose: the
//! first `end_batch_update` closes the batch for everyone.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;
use wren_core::{Error, Result};

use super::observable::{
    Callback, HasSubscribers, Observable, Subscribers, Subscription, attach, fan_out,
};

struct ListInner<T> {
    items: Vec<T>,
    version: u64,
    subscribers: Subscribers<Vec<T>>,
    batching: bool,
    pending: bool,
}

impl<T> HasSubscribers for ListInner<T> {
    type Value = Vec<T>;

    fn subscribers_mut(&mut self) -> &mut Subscribers<Vec<T>> {
        &mut self.subscribers
    }
}

/// A shared, observable `Vec<T>`.
///
/// Cloning an `ObservableList` yields another handle to the same list.
///
/// # Invariants
///
/// 1. Outside a batch, each mutating call notifies exactly once, even if the
///    contents end up unchanged (`clear()` on an empty list still notifies).
/// 2. Calls that leave the list untouched (`remove` of an absent value,
///    `pop` on an empty list, a rejected index) never notify.
/// 3. Inside a batch, mutations set a pending flag instead of notifying.
pub struct ObservableList<T> {
    inner: Rc<RefCell<ListInner<T>>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableList")
            .field("items", &inner.items)
            .field("version", &inner.version)
            .field("batching", &inner.batching)
            .finish()
    }
}

impl<T: Clone + 'static> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: Clone + 'static> FromIterator<T> for ObservableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Clone + 'static> ObservableList<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ListInner {
                items,
                version: 0,
                subscribers: Subscribers::default(),
                batching: false,
                pending: false,
            })),
        }
    }

    /// Apply `f` to the items. `f` returns its result and whether it mutated.
    fn edit<R>(&self, f: impl FnOnce(&mut Vec<T>) -> (R, bool)) -> R {
        let (result, flush) = {
            let mut inner = self.inner.borrow_mut();
            let (result, mutated) = f(&mut inner.items);
            if !mutated {
                return result;
            }
            inner.version += 1;
            if inner.batching {
                inner.pending = true;
                (result, false)
            } else {
                (result, true)
            }
        };
        if flush {
            self.notify();
        }
        result
    }

    // ── Reads ──────────────────────────────────────────────────────────

    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.borrow().items.get(index).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    /// Clone the whole sequence.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.borrow().items.clone()
    }

    #[must_use]
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.inner.borrow().items.contains(value)
    }

    // ── Mutations ──────────────────────────────────────────────────────

    /// Overwrite the element at `index`.
    pub fn set(&self, index: usize, value: T) -> Result<()> {
        self.edit(|items| {
            let len = items.len();
            match items.get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    (Ok(()), true)
                }
                None => (Err(Error::IndexOutOfBounds { index, len }), false),
            }
        })
    }

    /// Insert before `index`. An index past the end appends.
    pub fn insert(&self, index: usize, value: T) {
        self.edit(|items| {
            let at = index.min(items.len());
            items.insert(at, value);
            ((), true)
        });
    }

    pub fn push(&self, value: T) {
        self.edit(|items| {
            items.push(value);
            ((), true)
        });
    }

    /// Remove the first element equal to `value`. Returns whether one was found.
    pub fn remove(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.edit(|items| match items.iter().position(|item| item == value) {
            Some(pos) => {
                items.remove(pos);
                (true, true)
            }
            None => (false, false),
        })
    }

    /// Remove and return the element at `index`.
    pub fn remove_at(&self, index: usize) -> Result<T> {
        self.edit(|items| {
            if index < items.len() {
                (Ok(items.remove(index)), true)
            } else {
                let len = items.len();
                (Err(Error::IndexOutOfBounds { index, len }), false)
            }
        })
    }

    /// Append every item of `values`. Notifies once, even for an empty iterator.
    pub fn extend(&self, values: impl IntoIterator<Item = T>) {
        // Drain the iterator first; it may read this list.
        let values: Vec<T> = values.into_iter().collect();
        self.edit(|items| {
            items.extend(values);
            ((), true)
        });
    }

    pub fn clear(&self) {
        self.edit(|items| {
            items.clear();
            ((), true)
        });
    }

    /// Remove and return the element at `index`, or the last one for `None`.
    /// Returns `None` without notifying when there is nothing to pop.
    pub fn pop(&self, index: Option<usize>) -> Option<T> {
        self.edit(|items| {
            let popped = match index {
                None => items.pop(),
                Some(i) if i < items.len() => Some(items.remove(i)),
                Some(_) => None,
            };
            let mutated = popped.is_some();
            (popped, mutated)
        })
    }

    // ── Batching ───────────────────────────────────────────────────────

    /// Start holding back notifications. Clears any pending flag.
    pub fn begin_batch_update(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.batching = true;
        inner.pending = false;
    }

    /// Stop batching; notify once if anything changed since the batch began.
    pub fn end_batch_update(&self) {
        let flush = {
            let mut inner = self.inner.borrow_mut();
            inner.batching = false;
            std::mem::take(&mut inner.pending)
        };
        if flush {
            trace!(len = self.len(), "flushing batched list notification");
            self.notify();
        }
    }

    /// Whether a batch is open.
    #[must_use]
    pub fn is_batching(&self) -> bool {
        self.inner.borrow().batching
    }

    /// Open a batch that ends when the returned guard is dropped.
    pub fn batch(&self) -> BatchGuard<T> {
        self.begin_batch_update();
        BatchGuard { list: self.clone() }
    }

    /// Run `f` inside a batch. The batch ends even if `f` panics.
    pub fn batch_update<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        let _guard = self.batch();
        f(self)
    }
}

impl<T: Clone + 'static> Observable for ObservableList<T> {
    type Value = Vec<T>;

    fn with<R>(&self, f: impl FnOnce(&Vec<T>) -> R) -> R {
        f(&self.inner.borrow().items)
    }

    fn subscribe(&self, callback: impl Fn(&Vec<T>) + 'static) -> Subscription {
        attach(&self.inner, Rc::new(callback))
    }

    fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    fn notify(&self) {
        let (callbacks, items): (Vec<Callback<Vec<T>>>, Vec<T>) = {
            let inner = self.inner.borrow();
            (inner.subscribers.snapshot(), inner.items.clone())
        };
        fan_out(&callbacks, &items);
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for ObservableList<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.inner.borrow().items == *other
    }
}

impl<T: PartialEq> PartialEq<[T]> for ObservableList<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.inner.borrow().items.as_slice() == other
    }
}

/// Ends the batch it was created for when dropped.
#[must_use = "the batch ends as soon as the guard is dropped"]
pub struct BatchGuard<T: Clone + 'static> {
    list: ObservableList<T>,
}

impl<T: Clone + 'static> Drop for BatchGuard<T> {
    fn drop(&mut self) {
        self.list.end_batch_update();
    }
}

impl<T: Clone + 'static> fmt::Debug for BatchGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchGuard").finish_non_exhaustive()
    }
}
