#![forbid(unsafe_code)]

//! Change-tracked containers.
//!
//! - [`Observable`]: the notification protocol shared by every container.
//! - [`ObservableValue`]: a single value with equality-based change
//!   suppression.
//! - [`ObservableList`]: an ordered collection where every structural
//!   mutation notifies, with optional batching.
//! - [`Subscription`]: guard returned by `subscribe`; dropping it unregisters
//!   the callback, [`Subscription::detach`] keeps it for good.
//!
//! # Architecture
//!
//! Containers are `Rc<RefCell<..>>` handles for single-threaded shared
//! ownership. Subscribers are kept in registration order. Notification takes
//! a snapshot of the callbacks and the current value, releases the borrow,
//! then calls each callback, so callbacks may read or write the container
//! re-entrantly.
//!
//! # Invariants
//!
//! 1. `ObservableValue::set(v)` with `v == current` neither notifies nor bumps
//!    the version.
//! 2. Subscribers are notified in registration order, synchronously.
//! 3. Outside a batch, every mutating `ObservableList` call notifies once.
//! 4. Inside a batch, an `ObservableList` notifies at most once, at batch
//!    end, and only if something was mutated.

pub mod list;
pub mod observable;
pub mod value;

pub use list::{BatchGuard, ObservableList};
pub use observable::{Observable, Subscription};
pub use value::ObservableValue;
