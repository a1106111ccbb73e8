#![forbid(unsafe_code)]

//! State-property declarations and the containers they materialize.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::mvc::Model;
use crate::reactive::observable::Callback;
use crate::reactive::{Observable, ObservableList, ObservableValue, Subscription};

use super::store::{ModelState, Subscribe};

/// Shape of a declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// Backed by an [`ObservableValue`].
    Scalar,
    /// Backed by an [`ObservableList`].
    Sequence,
}

/// A container a [`StateProperty`] can materialize per model instance.
pub trait StateContainer: Observable + Clone + 'static {
    const KIND: StateKind;

    /// Build a fresh container holding `initial`.
    fn materialize(initial: Self::Value) -> Self;

    /// Route a whole-value assignment through the container's change rules.
    fn assign(&self, value: Self::Value);

    /// Clone of the current value.
    fn snapshot(&self) -> Self::Value;
}

impl<T: Clone + PartialEq + 'static> StateContainer for ObservableValue<T> {
    const KIND: StateKind = StateKind::Scalar;

    fn materialize(initial: T) -> Self {
        ObservableValue::new(initial)
    }

    fn assign(&self, value: T) {
        self.set(value);
    }

    fn snapshot(&self) -> T {
        self.get()
    }
}

impl<T: Clone + 'static> StateContainer for ObservableList<T> {
    const KIND: StateKind = StateKind::Sequence;

    fn materialize(initial: Vec<T>) -> Self {
        ObservableList::new(initial)
    }

    /// Replace the contents in place so existing subscriptions survive:
    /// clear, then extend with `value` if it is non-empty.
    fn assign(&self, value: Vec<T>) {
        self.clear();
        if !value.is_empty() {
            self.extend(value);
        }
    }

    fn snapshot(&self) -> Vec<T> {
        self.to_vec()
    }
}

/// Type-erased view of a [`StateProperty`], used for a model's declaration table.
pub trait Declaration {
    fn name(&self) -> &'static str;

    fn kind(&self) -> StateKind;

    /// Type name of the value subscribers receive.
    fn value_type_name(&self) -> &'static str;

    #[doc(hidden)]
    fn container_type(&self) -> TypeId;

    #[doc(hidden)]
    fn materialize(&self) -> Box<dyn Any>;

    /// A boxed `Subscribe<V>` for this property's container inside `state`.
    #[doc(hidden)]
    fn subscriber(&self, state: &ModelState) -> Box<dyn Any>;
}

/// Declaration of a reactive model field.
///
/// Declared once as an associated `const` of the model type; each model
/// instance gets its own container on first access (or at construction, via
/// [`ModelState::new`]). The initial value comes from a factory so sequence
/// defaults are never shared between instances.
pub struct StateProperty<C: StateContainer> {
    name: &'static str,
    initial: fn() -> C::Value,
    _container: PhantomData<fn() -> C>,
}

/// A scalar state property.
pub type Scalar<T> = StateProperty<ObservableValue<T>>;

/// A sequence state property.
pub type Sequence<T> = StateProperty<ObservableList<T>>;

impl<C: StateContainer> StateProperty<C> {
    #[must_use]
    pub const fn new(name: &'static str, initial: fn() -> C::Value) -> Self {
        Self {
            name,
            initial,
            _container: PhantomData,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// A fresh copy of the declared initial value.
    #[must_use]
    pub fn initial(&self) -> C::Value {
        (self.initial)()
    }

    /// The container backing this property on `model`.
    pub fn get<M: Model + ?Sized>(&self, model: &M) -> C {
        model.state().container(self)
    }

    /// Current value of this property on `model`.
    pub fn value<M: Model + ?Sized>(&self, model: &M) -> C::Value {
        self.get(model).snapshot()
    }

    /// Assign `value`. Scalars suppress equal writes; sequences are cleared
    /// and refilled in place.
    pub fn set<M: Model + ?Sized>(&self, model: &M, value: C::Value) {
        self.get(model).assign(value);
    }

    /// Subscribe to changes of this property on `model`.
    pub fn register_change<M: Model + ?Sized>(
        &self,
        model: &M,
        callback: impl Fn(&C::Value) + 'static,
    ) -> Subscription {
        self.get(model).subscribe(callback)
    }
}

impl<C: StateContainer> Clone for StateProperty<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: StateContainer> Copy for StateProperty<C> {}

impl<C: StateContainer> fmt::Debug for StateProperty<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateProperty")
            .field("name", &self.name)
            .field("kind", &C::KIND)
            .field("value", &type_name::<C::Value>())
            .finish()
    }
}

impl<C: StateContainer> Declaration for StateProperty<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn kind(&self) -> StateKind {
        C::KIND
    }

    fn value_type_name(&self) -> &'static str {
        type_name::<C::Value>()
    }

    fn container_type(&self) -> TypeId {
        TypeId::of::<C>()
    }

    fn materialize(&self) -> Box<dyn Any> {
        Box::new(C::materialize(self.initial()))
    }

    fn subscriber(&self, state: &ModelState) -> Box<dyn Any> {
        let container = state.container(self);
        let subscribe: Subscribe<C::Value> =
            Rc::new(move |callback: Callback<C::Value>| container.subscribe(move |value| callback(value)));
        Box::new(subscribe)
    }
}
