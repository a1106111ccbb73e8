#![forbid(unsafe_code)]

//! Views: consumers that dispatch through a context.

use wren_core::{DispatchReport, Event};

use super::context::Context;

/// Something that sends events through a [`Context`].
///
/// The context is read-only from the view's side; there is no setter.
/// A view usually also holds its model and subscribes to state changes
/// to re-render.
pub trait View {
    fn context(&self) -> &Context;

    fn dispatch(&self, event: &Event) -> DispatchReport {
        self.context().dispatch(event)
    }
}
