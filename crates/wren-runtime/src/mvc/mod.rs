#![forbid(unsafe_code)]

//! Model, command, context, and view.
//!
//! A [`View`] dispatches an [`Event`](wren_core::Event) through its
//! [`Context`]. The context's dispatcher calls every [`Command`] mapped to
//! the event name, each command mutates its [`Model`]'s state properties,
//! and the resulting notifications reach whoever subscribed, typically the
//! view's render method.

pub mod command;
pub mod context;
pub mod model;
pub mod view;

pub use command::{Command, PayloadExt};
pub use context::{CommandMapping, Context};
pub use model::Model;
pub use view::View;
