#![forbid(unsafe_code)]

//! Per-instance storage for state-property containers.

use std::any::{Any, TypeId, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};
use wren_core::{Error, Result};

use crate::mvc::Model;
use crate::reactive::Subscription;
use crate::reactive::observable::Callback;

use super::property::{Declaration, StateContainer, StateProperty};

/// Registers a callback on one property's container.
pub(crate) type Subscribe<V> = Rc<dyn Fn(Callback<V>) -> Subscription>;

type SlotKey = (&'static str, TypeId);

/// The containers backing one model instance's declared properties.
///
/// Each model owns one `ModelState`. Containers are keyed by property name
/// and container type, created at most once, and reused on every later
/// access.
#[derive(Default)]
pub struct ModelState {
    slots: RefCell<HashMap<SlotKey, Box<dyn Any>>>,
}

impl ModelState {
    /// Storage for a model of type `M`, with every declared property
    /// materialized up front.
    #[must_use]
    pub fn new<M: Model>() -> Self {
        let state = Self::lazy();
        {
            let mut slots = state.slots.borrow_mut();
            for decl in M::DECLARATIONS {
                slots
                    .entry((decl.name(), decl.container_type()))
                    .or_insert_with(|| decl.materialize());
            }
        }
        debug!(
            model = type_name::<M>(),
            properties = M::DECLARATIONS.len(),
            "materialized model state"
        );
        state
    }

    /// Storage that materializes each property on first access.
    #[must_use]
    pub fn lazy() -> Self {
        Self::default()
    }

    /// Whether `name` already has a container here.
    #[must_use]
    pub fn is_materialized(&self, name: &str) -> bool {
        self.slots.borrow().keys().any(|(slot, _)| *slot == name)
    }

    /// Number of materialized containers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// The container for `property`, created from its initial value if this
    /// is the first access.
    pub(crate) fn container<C: StateContainer>(&self, property: &StateProperty<C>) -> C {
        let key = (property.name(), TypeId::of::<C>());
        let existing = self
            .slots
            .borrow()
            .get(&key)
            .and_then(|slot| slot.downcast_ref::<C>())
            .cloned();
        if let Some(container) = existing {
            return container;
        }

        let container = C::materialize(property.initial());
        trace!(property = property.name(), "materialized state property");
        self.slots
            .borrow_mut()
            .insert(key, Box::new(container.clone()));
        container
    }

    /// Typed registration function for `decl`, or a state error if the
    /// property does not carry values of type `V`.
    pub(crate) fn subscriber<V: 'static>(&self, decl: &dyn Declaration) -> Result<Subscribe<V>> {
        decl.subscriber(self)
            .downcast::<Subscribe<V>>()
            .map(|subscribe| *subscribe)
            .map_err(|_| Error::PropertyType {
                name: decl.name().to_string(),
                declared: decl.value_type_name(),
                requested: type_name::<V>(),
            })
    }
}

impl fmt::Debug for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        let mut names: Vec<&str> = slots.keys().map(|(name, _)| *name).collect();
        names.sort_unstable();
        f.debug_struct("ModelState")
            .field("properties", &names)
            .finish()
    }
}

/// Deferred registration for one property, from [`Model::change_registrar`].
///
/// The property name and value type are checked when the registrar is
/// created, so [`register`](Self::register) cannot fail.
pub struct ChangeRegistrar<V> {
    property: &'static str,
    subscribe: Subscribe<V>,
}

impl<V: 'static> ChangeRegistrar<V> {
    pub(crate) fn new(property: &'static str, subscribe: Subscribe<V>) -> Self {
        Self {
            property,
            subscribe,
        }
    }

    #[must_use]
    pub fn property(&self) -> &'static str {
        self.property
    }

    /// Register `callback` on the property.
    pub fn register(&self, callback: impl Fn(&V) + 'static) -> Subscription {
        (self.subscribe)(Rc::new(callback))
    }
}

impl<V> fmt::Debug for ChangeRegistrar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeRegistrar")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}
