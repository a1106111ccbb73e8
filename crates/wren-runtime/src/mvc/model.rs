#![forbid(unsafe_code)]

//! The reactive model contract.

use tracing::trace;
use wren_core::{Error, Result};

use crate::reactive::Subscription;
use crate::state::{ChangeRegistrar, Declaration, ModelState};

/// A type whose reactive fields are declared [`StateProperty`] constants.
///
/// Implementors list their declarations in [`DECLARATIONS`] and build their
/// [`ModelState`] with [`ModelState::new::<Self>()`](ModelState::new), which
/// materializes every field before the constructor returns.
///
/// [`StateProperty`]: crate::state::StateProperty
/// [`DECLARATIONS`]: Model::DECLARATIONS
pub trait Model {
    /// Every state property this model exposes by name.
    const DECLARATIONS: &'static [&'static dyn Declaration];

    fn state(&self) -> &ModelState;

    /// Look up a declared property by name.
    fn declaration(name: &str) -> Result<&'static dyn Declaration>
    where
        Self: Sized,
    {
        Self::DECLARATIONS
            .iter()
            .copied()
            .find(|decl| decl.name() == name)
            .ok_or_else(|| Error::UnknownProperty {
                name: name.to_string(),
            })
    }

    /// Subscribe `callback` to changes of the property called `name`.
    ///
    /// The callback stays registered for as long as the returned
    /// [`Subscription`] lives; `let _ = model.on_change(..)` unregisters it
    /// immediately. Call [`Subscription::detach`] to keep it for the life of
    /// the model:
    ///
    /// ```ignore
    /// model.on_change("count", |n: &i64| println!("{n}"))?.detach();
    /// ```
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProperty`] if `name` is not declared, and
    /// [`Error::PropertyType`] if the property does not carry `V` values.
    fn on_change<V: 'static>(
        &self,
        name: &str,
        callback: impl Fn(&V) + 'static,
    ) -> Result<Subscription>
    where
        Self: Sized,
    {
        Ok(self.change_registrar::<V>(name)?.register(callback))
    }

    /// Validate `name` and `V` now; register callbacks later through the
    /// returned [`ChangeRegistrar`].
    fn change_registrar<V: 'static>(&self, name: &str) -> Result<ChangeRegistrar<V>>
    where
        Self: Sized,
    {
        let decl = Self::declaration(name)?;
        let subscribe = self.state().subscriber::<V>(decl)?;
        trace!(property = decl.name(), "change registrar created");
        Ok(ChangeRegistrar::new(decl.name(), subscribe))
    }
}
